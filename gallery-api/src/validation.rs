//! Validation functions
//!

use chrono::NaiveDate;
use snafu::prelude::*;

use crate::{
    Result,
    config::{
        VALIDATION_ID_MAX_LEN, VALIDATION_MARKDOWN_MAX_LEN, VALIDATION_TAG_MAX_COUNT,
        VALIDATION_TAG_MAX_LEN, VALIDATION_THUMBNAIL_MAX_LEN, VALIDATION_TITLE_MAX_LEN,
    },
    error::ValidationSnafu,
    items::Item,
};

/// Validation limits for sanity checking items before they are saved, and
/// text assets after they are loaded.
/// All limits can be adjusted at client or session creation time.
#[derive(Debug, Clone)]
pub struct ValidationLimits {
    /// max length of an item id in bytes
    pub id_max_len: u64,

    /// max length of a title in bytes
    pub title_max_len: u64,

    /// max number of tags
    pub tag_max_count: u64,

    /// max length of a tag
    pub tag_max_len: u64,

    /// max size of markdown in bytes
    pub markdown_max_len: u64,

    /// max size of an uploaded thumbnail in bytes
    pub thumbnail_max_len: u64,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        ValidationLimits {
            // default: 200 B
            id_max_len: VALIDATION_ID_MAX_LEN,
            // default: 4096 B
            title_max_len: VALIDATION_TITLE_MAX_LEN,
            // default: 256 tags
            tag_max_count: VALIDATION_TAG_MAX_COUNT,
            // default: 256 B
            tag_max_len: VALIDATION_TAG_MAX_LEN,
            // default: 10 MiB
            markdown_max_len: VALIDATION_MARKDOWN_MAX_LEN,
            // default: 50 MiB
            thumbnail_max_len: VALIDATION_THUMBNAIL_MAX_LEN,
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn within(len: usize, max: u64) -> bool {
    len <= max as usize
}

impl ValidationLimits {
    /// Checks an item id: not empty, bounded, and usable as a file name.
    pub fn validate_id(&self, id: &str, description: &str) -> Result<()> {
        ensure!(
            !id.trim().is_empty(),
            ValidationSnafu {
                message: format!("{description} id cannot be empty"),
            }
        );
        ensure!(
            within(id.len(), self.id_max_len),
            ValidationSnafu {
                message: format!(
                    "{description} id too long: {} bytes (max: {})",
                    id.len(),
                    self.id_max_len
                ),
            }
        );
        ensure!(
            !id.contains(['/', '\\']) && id != "." && id != ".." && !id.contains('\0'),
            ValidationSnafu {
                message: format!("{description} id '{id}' cannot contain path separators"),
            }
        );
        Ok(())
    }

    pub fn validate_title(&self, title: &str, description: &str) -> Result<()> {
        ensure!(
            within(title.len(), self.title_max_len),
            ValidationSnafu {
                message: format!(
                    "{description} title too long: {} bytes (max: {})",
                    title.len(),
                    self.title_max_len
                ),
            }
        );
        Ok(())
    }

    pub fn validate_tag(&self, tag: &str, description: &str) -> Result<()> {
        ensure!(
            !tag.is_empty(),
            ValidationSnafu {
                message: format!("{description} tag cannot be an empty string"),
            }
        );
        ensure!(
            within(tag.len(), self.tag_max_len),
            ValidationSnafu {
                message: format!(
                    "{description} tag too long: {} bytes (max: {})",
                    tag.len(),
                    self.tag_max_len
                ),
            }
        );
        Ok(())
    }

    pub fn validate_num_tags(&self, count: usize, description: &str) -> Result<()> {
        ensure!(
            within(count, self.tag_max_count),
            ValidationSnafu {
                message: format!(
                    "{description} too many tags: {count} (max: {})",
                    self.tag_max_count
                ),
            }
        );
        Ok(())
    }

    pub fn validate_markdown(&self, md: &str, description: &str) -> Result<()> {
        ensure!(
            within(md.len(), self.markdown_max_len),
            ValidationSnafu {
                message: format!(
                    "{description} markdown too long: {} bytes (max: {})",
                    md.len(),
                    self.markdown_max_len
                ),
            }
        );
        Ok(())
    }

    pub fn validate_thumbnail(&self, len: usize, description: &str) -> Result<()> {
        ensure!(
            within(len, self.thumbnail_max_len),
            ValidationSnafu {
                message: format!(
                    "{description} thumbnail too large: {len} bytes (max: {})",
                    self.thumbnail_max_len
                ),
            }
        );
        Ok(())
    }

    /// Checks an ISO `YYYY-MM-DD` date.
    pub fn validate_date(&self, date: &str, description: &str) -> Result<()> {
        ensure!(
            NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok(),
            ValidationSnafu {
                message: format!("{description} date '{date}' is not YYYY-MM-DD"),
            }
        );
        Ok(())
    }

    /// Checks every field of an item about to be saved.
    pub fn validate_item(&self, item: &Item) -> Result<()> {
        let description = format!("item {}", item.id);
        self.validate_id(&item.id, "item")?;
        if let Some(title) = &item.title {
            self.validate_title(title, &description)?;
        }
        if let Some(date) = item.date() {
            self.validate_date(date, &description)?;
        }
        self.validate_num_tags(item.tags.len(), &description)?;
        for tag in &item.tags {
            self.validate_tag(tag, &description)?;
        }
        Ok(())
    }
}
