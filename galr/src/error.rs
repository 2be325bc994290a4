//! Exit codes
//!
//! - 0: success
//! - 1: any other failure
//! - 2: validation failure
//! - 3: cancelled by the user

use gallery::error::GalleryError;

pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_VALIDATION: i32 = 2;
pub const EXIT_CANCELLED: i32 = 3;

pub fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<GalleryError>() {
        Some(GalleryError::Cancelled) => EXIT_CANCELLED,
        Some(GalleryError::Validation { .. }) => EXIT_VALIDATION,
        _ => EXIT_FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes() {
        assert_eq!(exit_code(&GalleryError::Cancelled.into()), EXIT_CANCELLED);
        let validation = GalleryError::Validation {
            message: "bad id".into(),
        };
        assert_eq!(exit_code(&validation.into()), EXIT_VALIDATION);
        assert_eq!(exit_code(&anyhow::anyhow!("boom")), EXIT_FAILURE);
    }
}
