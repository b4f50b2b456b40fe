use crate::{error::AppError, models::comments::ApprovalStatus};

/// Approval is required when the entity type is moderated globally or the
/// entity itself asks for it.
pub fn requires_approval(entity_type: &str, entity_requires: bool, moderated: &[String]) -> bool {
    entity_requires || moderated.iter().any(|moderated| moderated == entity_type)
}

pub fn decide_status(
    approval_required: bool,
    requested: Option<ApprovalStatus>,
) -> Result<ApprovalStatus, AppError> {
    if !approval_required {
        return Ok(ApprovalStatus::Approved);
    }
    match requested {
        None | Some(ApprovalStatus::Pending) => Ok(ApprovalStatus::Pending),
        Some(_) => Err(AppError::InvalidApprovalStatus(
            "Invalid approval status".to_string(),
        )),
    }
}
