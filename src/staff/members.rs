//! Staff member projection
//!
//! Builds [`StaffMember`]s from directory users, sorted by payroll number.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{AppError, Result, ResultExt};
use crate::models::StaffMember;
use crate::staff::{DirectoryUser, StaffDirectory};

const GIVEN_NAME: &str = "given_name";
const FAMILY_NAME: &str = "family_name";
const PAYROLL_NUMBER: &str = "custom:payroll_number";

/// Staff lookups over the identity directory.
#[derive(Clone)]
pub struct StaffMembers {
    directory: Arc<dyn StaffDirectory>,
}

impl StaffMembers {
    pub fn new(directory: Arc<dyn StaffDirectory>) -> Self {
        Self { directory }
    }

    /// Every staff member with a payroll number, ascending by payroll number.
    pub async fn list(&self) -> Result<Vec<StaffMember>> {
        let users = self
            .directory
            .list_users()
            .await
            .context("Error retrieving staff members")?;

        let mut members: Vec<StaffMember> = users.iter().filter_map(project).collect();
        members.sort_by_key(|member| member.payroll_number);
        debug!(count = members.len(), "Listed staff members");
        Ok(members)
    }

    pub async fn get(&self, payroll_number: i32) -> Result<StaffMember> {
        self.list()
            .await?
            .into_iter()
            .find(|member| member.payroll_number == payroll_number)
            .ok_or_else(|| AppError::not_found("Staff member not found"))
    }
}

fn project(user: &DirectoryUser) -> Option<StaffMember> {
    let payroll_number = match user.attribute(PAYROLL_NUMBER).map(str::parse::<i32>) {
        Some(Ok(number)) => number,
        _ => {
            warn!(username = %user.username, "Skipping directory user without a payroll number");
            return None;
        }
    };

    Some(StaffMember {
        payroll_number,
        first_name: user.attribute(GIVEN_NAME).unwrap_or_default().to_string(),
        last_name: user.attribute(FAMILY_NAME).unwrap_or_default().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::staff::StaticStaffDirectory;

    fn staff() -> StaffMembers {
        let directory = StaticStaffDirectory::new(vec![
            DirectoryUser::new(
                "bjones",
                [
                    (GIVEN_NAME, "Bea"),
                    (FAMILY_NAME, "Jones"),
                    (PAYROLL_NUMBER, "2001"),
                ],
            ),
            DirectoryUser::new("contractor", [(GIVEN_NAME, "Cal")]),
            DirectoryUser::new(
                "asmith",
                [
                    (GIVEN_NAME, "Ann"),
                    (FAMILY_NAME, "Smith"),
                    (PAYROLL_NUMBER, "1042"),
                ],
            ),
        ]);
        StaffMembers::new(Arc::new(directory))
    }

    #[tokio::test]
    async fn test_list_sorted_by_payroll_number() {
        let members = staff().list().await.unwrap();
        let numbers: Vec<i32> = members.iter().map(|m| m.payroll_number).collect();
        assert_eq!(numbers, vec![1042, 2001]);
        assert_eq!(members[0].first_name, "Ann");
        assert_eq!(members[0].last_name, "Smith");
    }

    #[tokio::test]
    async fn test_get_unknown_payroll_number() {
        let result = staff().get(9999).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
