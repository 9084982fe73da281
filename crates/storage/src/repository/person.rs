use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::Person;
use crate::store::{NewPerson, PersonUpdate};

/// Repository for Person database operations
pub struct PersonRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PersonRepository<'a> {
    /// Create a new PersonRepository
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all persons
    pub async fn list(&self) -> Result<Vec<Person>> {
        let persons = sqlx::query_as::<_, Person>(
            r#"
            SELECT person_id, badge_id, full_name, team, role, edit_count, created_at
            FROM persons
            ORDER BY full_name, created_at
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(persons)
    }

    /// Get a person by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Person> {
        let person = sqlx::query_as::<_, Person>(
            r#"
            SELECT person_id, badge_id, full_name, team, role, edit_count, created_at
            FROM persons
            WHERE person_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(person)
    }

    /// Get a person by the badge identifier encoded in their QR code
    pub async fn find_by_badge(&self, badge_id: &str) -> Result<Option<Person>> {
        let person = sqlx::query_as::<_, Person>(
            r#"
            SELECT person_id, badge_id, full_name, team, role, edit_count, created_at
            FROM persons
            WHERE badge_id = $1
            "#,
        )
        .bind(badge_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(person)
    }

    /// Create a new person
    pub async fn create(&self, person: &NewPerson) -> Result<Person> {
        let person = sqlx::query_as::<_, Person>(
            r#"
            INSERT INTO persons (badge_id, full_name, team, role)
            VALUES ($1, $2, $3, $4)
            RETURNING person_id, badge_id, full_name, team, role, edit_count, created_at
            "#,
        )
        .bind(&person.badge_id)
        .bind(&person.full_name)
        .bind(&person.team)
        .bind(person.role)
        .fetch_one(self.pool)
        .await
        .map_err(|e| StorageError::from(e).on_unique_violation("Badge already exists"))?;

        Ok(person)
    }

    /// Administrative update; leaves the edit counter alone
    pub async fn update(&self, id: Uuid, update: &PersonUpdate) -> Result<Person> {
        let person = sqlx::query_as::<_, Person>(
            r#"
            UPDATE persons
            SET full_name = $2, team = $3, role = $4
            WHERE person_id = $1
            RETURNING person_id, badge_id, full_name, team, role, edit_count, created_at
            "#,
        )
        .bind(id)
        .bind(&update.full_name)
        .bind(&update.team)
        .bind(update.role)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(person)
    }

    /// Self-service update guarded by the edit counter in the same statement
    pub async fn self_edit(
        &self,
        id: Uuid,
        update: &PersonUpdate,
        limit: i32,
    ) -> Result<Option<Person>> {
        let person = sqlx::query_as::<_, Person>(
            r#"
            UPDATE persons
            SET full_name = $2, team = $3, role = $4, edit_count = edit_count + 1
            WHERE person_id = $1 AND edit_count < $5
            RETURNING person_id, badge_id, full_name, team, role, edit_count, created_at
            "#,
        )
        .bind(id)
        .bind(&update.full_name)
        .bind(&update.team)
        .bind(update.role)
        .bind(limit)
        .fetch_optional(self.pool)
        .await?;

        if person.is_none() {
            // Distinguish an unknown person from an exhausted edit budget.
            self.find_by_id(id).await?;
        }

        Ok(person)
    }

    /// Delete a person; logbook rows go with them through ON DELETE CASCADE
    pub async fn delete(&self, id: Uuid) -> Result<Person> {
        let person = sqlx::query_as::<_, Person>(
            r#"
            DELETE FROM persons
            WHERE person_id = $1
            RETURNING person_id, badge_id, full_name, team, role, edit_count, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(person)
    }
}
