/// Task model and owner-scoped database operations
///
/// Every read and write on a task carries the owner's id in the predicate,
/// so a task belonging to someone else is indistinguishable from a task
/// that does not exist. That single `WHERE id = $1 AND owner_id = $2`
/// clause is the entire cross-user access control for tasks.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     description TEXT NOT NULL,
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

const TASK_COLUMNS: &str = "id, owner_id, description, completed, created_at, updated_at";

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Owning user; set once at creation and never updated
    pub owner_id: Uuid,

    /// What needs doing
    pub description: String,

    /// Whether the task is done
    pub completed: bool,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone)]
pub struct CreateTask {
    /// Owning user (always the authenticated caller)
    pub owner_id: Uuid,

    /// Description (already trimmed)
    pub description: String,

    /// Initial completion state
    pub completed: bool,
}

/// Input for updating a task
///
/// Only `Some` fields are written.
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    /// New description (already trimmed)
    pub description: Option<String>,

    /// New completion state
    pub completed: Option<bool>,
}

/// Columns a task listing may sort on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Description,
    Completed,
    CreatedAt,
    UpdatedAt,
}

impl SortColumn {
    /// SQL column name; the whitelist here is what keeps user-supplied sort
    /// keys out of the query text.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortColumn::Description => "description",
            SortColumn::Completed => "completed",
            SortColumn::CreatedAt => "created_at",
            SortColumn::UpdatedAt => "updated_at",
        }
    }

    fn parse(field: &str) -> Option<Self> {
        match field {
            "description" => Some(SortColumn::Description),
            "completed" => Some(SortColumn::Completed),
            "createdAt" | "created_at" => Some(SortColumn::CreatedAt),
            "updatedAt" | "updated_at" => Some(SortColumn::UpdatedAt),
            _ => None,
        }
    }
}

/// Parsed `sortBy` query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSort {
    pub column: SortColumn,
    pub descending: bool,
}

impl Default for TaskSort {
    fn default() -> Self {
        Self {
            column: SortColumn::CreatedAt,
            descending: false,
        }
    }
}

impl TaskSort {
    /// Parses a `field:direction` sort expression
    ///
    /// The direction `desc` sorts descending; anything else (including an
    /// absent direction) sorts ascending. Unknown fields are rejected so the
    /// column name can be spliced into SQL safely.
    pub fn parse(expr: &str) -> Result<Self, String> {
        let (field, direction) = match expr.split_once(':') {
            Some((field, direction)) => (field, direction),
            None => (expr, ""),
        };

        let column = SortColumn::parse(field)
            .ok_or_else(|| format!("Cannot sort tasks by '{field}'"))?;

        Ok(Self {
            column,
            descending: direction == "desc",
        })
    }
}

/// Filter, sort, and pagination options for listing tasks
#[derive(Debug, Clone, Default)]
pub struct TaskListOptions {
    /// Keep only tasks with this completion state
    pub completed: Option<bool>,

    /// Sort order (defaults to created_at ascending)
    pub sort: TaskSort,

    /// Maximum number of rows to return (None = no bound)
    pub limit: Option<i64>,

    /// Number of rows to skip
    pub skip: Option<i64>,
}

impl Task {
    /// Creates a new task
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks (owner_id, description, completed) \
             VALUES ($1, $2, $3) \
             RETURNING {TASK_COLUMNS}"
        );

        let task = sqlx::query_as::<_, Task>(&query)
            .bind(data.owner_id)
            .bind(data.description)
            .bind(data.completed)
            .fetch_one(pool)
            .await?;

        Ok(task)
    }

    /// Finds a task by id within the owner's scope
    ///
    /// Returns None both when the id does not exist and when it belongs to
    /// another user.
    pub async fn find_for_owner(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND owner_id = $2");

        let task = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(pool)
            .await?;

        Ok(task)
    }

    /// Lists the owner's tasks with optional filter, sort, and pagination
    ///
    /// Zero matches yields an empty vector, never an error.
    pub async fn list_for_owner(
        pool: &PgPool,
        owner_id: Uuid,
        options: &TaskListOptions,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE owner_id = $1");

        if options.completed.is_some() {
            query.push_str(" AND completed = $2");
        }

        // Sort column comes from the SortColumn whitelist, never raw input.
        query.push_str(&format!(
            " ORDER BY {} {}",
            options.sort.column.as_str(),
            if options.sort.descending { "DESC" } else { "ASC" }
        ));

        // A NULL limit means "no bound" to Postgres.
        let (limit_bind, skip_bind) = if options.completed.is_some() {
            ("$3", "$4")
        } else {
            ("$2", "$3")
        };
        query.push_str(&format!(" LIMIT {limit_bind} OFFSET {skip_bind}"));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(owner_id);
        if let Some(completed) = options.completed {
            q = q.bind(completed);
        }
        q = q.bind(options.limit).bind(options.skip.unwrap_or(0));

        let tasks = q.fetch_all(pool).await?;

        Ok(tasks)
    }

    /// Updates a task within the owner's scope
    ///
    /// # Returns
    ///
    /// The updated task, or None when no task matches id + owner
    pub async fn update_for_owner(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 2;

        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${bind_count}"));
        }
        if data.completed.is_some() {
            bind_count += 1;
            query.push_str(&format!(", completed = ${bind_count}"));
        }

        query.push_str(&format!(
            " WHERE id = $1 AND owner_id = $2 RETURNING {TASK_COLUMNS}"
        ));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id).bind(owner_id);

        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(completed) = data.completed {
            q = q.bind(completed);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Deletes a task within the owner's scope, returning the deleted record
    ///
    /// # Returns
    ///
    /// The deleted task, or None when no task matches id + owner
    pub async fn delete_for_owner(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query =
            format!("DELETE FROM tasks WHERE id = $1 AND owner_id = $2 RETURNING {TASK_COLUMNS}");

        let task = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(pool)
            .await?;

        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_parse_field_and_direction() {
        let sort = TaskSort::parse("completed:desc").unwrap();
        assert_eq!(sort.column, SortColumn::Completed);
        assert!(sort.descending);

        let sort = TaskSort::parse("description:asc").unwrap();
        assert_eq!(sort.column, SortColumn::Description);
        assert!(!sort.descending);
    }

    #[test]
    fn test_sort_parse_unknown_direction_is_ascending() {
        // Anything other than "desc" sorts ascending.
        let sort = TaskSort::parse("createdAt:sideways").unwrap();
        assert_eq!(sort.column, SortColumn::CreatedAt);
        assert!(!sort.descending);

        let sort = TaskSort::parse("createdAt").unwrap();
        assert!(!sort.descending);
    }

    #[test]
    fn test_sort_parse_rejects_unknown_column() {
        assert!(TaskSort::parse("owner_id:desc").is_err());
        assert!(TaskSort::parse("; DROP TABLE tasks").is_err());
        assert!(TaskSort::parse("").is_err());
    }

    #[test]
    fn test_sort_default() {
        let sort = TaskSort::default();
        assert_eq!(sort.column, SortColumn::CreatedAt);
        assert!(!sort.descending);
    }

    #[test]
    fn test_sort_column_names_are_safe() {
        for column in [
            SortColumn::Description,
            SortColumn::Completed,
            SortColumn::CreatedAt,
            SortColumn::UpdatedAt,
        ] {
            assert!(column
                .as_str()
                .chars()
                .all(|c| c.is_ascii_lowercase() || c == '_'));
        }
    }
}
