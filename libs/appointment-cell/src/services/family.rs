use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use patient_cell::models::{CreateFamilyMemberRequest, FamilyMember};
use shared_models::notice::Notice;

use crate::error::BookingError;
use crate::services::gateway::FamilyDirectory;

/// Patient-step state: the dependents on file and the inline "add member" dialog.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FamilyMemberFlow {
    pub members: Vec<FamilyMember>,
    pub dialog_open: bool,
    /// Last form submitted from the dialog. Kept after a failed create.
    pub form: CreateFamilyMemberRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FamilyCreateOutcome {
    pub notice: Notice,
    pub member: Option<FamilyMember>,
}

impl FamilyMemberFlow {
    pub fn open_create_dialog(&mut self) {
        self.dialog_open = true;
    }

    pub fn find(&self, member_id: Uuid) -> Option<&FamilyMember> {
        self.members.iter().find(|member| member.id == member_id)
    }

    pub async fn reload(
        &mut self,
        directory: &dyn FamilyDirectory,
        auth_token: &str,
    ) -> Result<usize, BookingError> {
        let members = directory
            .list_members(auth_token)
            .await
            .map_err(|e| {
                warn!("Failed to load family members: {}", e);
                BookingError::FamilyLookupFailed(e.to_string())
            })?;

        self.members = members;
        Ok(self.members.len())
    }

    /// Submit the dialog form. The dialog closes either way; the list is
    /// reloaded from the backend only on success.
    pub async fn create_member(
        &mut self,
        directory: &dyn FamilyDirectory,
        form: CreateFamilyMemberRequest,
        auth_token: &str,
    ) -> FamilyCreateOutcome {
        self.form = form.clone();
        let result = directory.create_member(form, auth_token).await;
        self.dialog_open = false;

        match result {
            Ok(member) => {
                info!("Family member {} added", member.id);
                self.form = CreateFamilyMemberRequest::default();
                if let Err(e) = self.reload(directory, auth_token).await {
                    warn!("Member created but list refresh failed: {}", e);
                }
                FamilyCreateOutcome {
                    notice: Notice::success("Family member added successfully"),
                    member: Some(member),
                }
            }
            Err(e) => {
                error!("Failed to add family member: {}", e);
                FamilyCreateOutcome {
                    notice: Notice::error("Failed to add family member"),
                    member: None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use shared_models::notice::NoticeLevel;

    use crate::services::gateway::MockFamilyDirectory;

    fn member(name: &str) -> FamilyMember {
        FamilyMember {
            id: Uuid::new_v4(),
            full_name: name.to_string(),
            relation: "child".to_string(),
            date_of_birth: None,
            gender: None,
        }
    }

    #[tokio::test]
    async fn test_create_reloads_list_and_closes_dialog() {
        let created = member("Anya");
        let listed = vec![member("Ravi"), created.clone()];

        let mut directory = MockFamilyDirectory::new();
        let returned = created.clone();
        directory.expect_create_member()
            .times(1)
            .returning(move |_, _| Ok(returned.clone()));
        directory.expect_list_members()
            .times(1)
            .returning(move |_| Ok(listed.clone()));

        let mut flow = FamilyMemberFlow::default();
        flow.open_create_dialog();
        let form = CreateFamilyMemberRequest {
            full_name: "Anya".to_string(),
            relation: "child".to_string(),
            ..Default::default()
        };

        let outcome = flow.create_member(&directory, form, "token").await;

        assert_eq!(outcome.notice.level, NoticeLevel::Success);
        assert_eq!(outcome.member, Some(created.clone()));
        assert!(!flow.dialog_open);
        assert_eq!(flow.members.len(), 2);
        assert!(flow.find(created.id).is_some());
        assert_eq!(flow.form, CreateFamilyMemberRequest::default());
    }

    #[tokio::test]
    async fn test_failed_create_keeps_form_and_list() {
        let mut directory = MockFamilyDirectory::new();
        directory.expect_create_member()
            .times(1)
            .returning(|_, _| Err(anyhow!("API error (400): relation required")));
        directory.expect_list_members().never();

        let existing = member("Ravi");
        let mut flow = FamilyMemberFlow {
            members: vec![existing.clone()],
            ..Default::default()
        };
        flow.open_create_dialog();
        let form = CreateFamilyMemberRequest {
            full_name: "Anya".to_string(),
            ..Default::default()
        };

        let outcome = flow.create_member(&directory, form.clone(), "token").await;

        assert_eq!(outcome.notice.level, NoticeLevel::Error);
        assert!(outcome.member.is_none());
        assert!(!flow.dialog_open);
        assert_eq!(flow.form, form);
        assert_eq!(flow.members, vec![existing]);
    }

    #[tokio::test]
    async fn test_blank_form_still_reaches_backend() {
        let mut directory = MockFamilyDirectory::new();
        directory.expect_create_member()
            .withf(|form, _| form.is_blank())
            .times(1)
            .returning(|_, _| Err(anyhow!("API error (422): full_name required")));

        let mut flow = FamilyMemberFlow::default();
        let outcome = flow
            .create_member(&directory, CreateFamilyMemberRequest::default(), "token")
            .await;

        assert_eq!(outcome.notice.level, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn test_reload_failure_keeps_members() {
        let mut directory = MockFamilyDirectory::new();
        directory.expect_list_members()
            .returning(|_| Err(anyhow!("timeout")));

        let existing = member("Ravi");
        let mut flow = FamilyMemberFlow {
            members: vec![existing.clone()],
            ..Default::default()
        };

        let result = flow.reload(&directory, "token").await;

        assert!(matches!(result, Err(BookingError::FamilyLookupFailed(_))));
        assert_eq!(flow.members, vec![existing]);
    }
}
