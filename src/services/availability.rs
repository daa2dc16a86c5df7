//! Per-title availability read model
//!
//! Pure read over the copy store. Borrowed counts cover both Borrowed
//! and Overdue rows, so the numbers do not depend on sweeper freshness.

use crate::{
    error::AppResult,
    models::title::TitleAvailability,
    repository::Repository,
};

#[derive(Clone)]
pub struct AvailabilityService {
    repository: Repository,
}

impl AvailabilityService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Copy counts for a title: total / available / borrowed
    pub async fn for_title(&self, title_id: i32) -> AppResult<TitleAvailability> {
        self.repository.titles.get_by_id(title_id).await?;
        self.repository.copies.availability(title_id).await
    }
}
