//! Local checks applied before a journal entry or an anonymous AI request
//! leaves the client. The backend enforces the same rules; checking here
//! saves a round trip and gives the user the same wording.

use shared::{CreateEntryRequest, HelpType};

use crate::error::{ClientError, ClientResult};

/// Trims the content and rejects blank entries.
pub fn prepare_entry(request: &CreateEntryRequest) -> ClientResult<CreateEntryRequest> {
    let content = request.content.trim();
    if content.is_empty() {
        return Err(ClientError::Validation(
            "Journal entry content cannot be empty.".to_string(),
        ));
    }

    let title = request
        .title
        .as_ref()
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty());

    Ok(CreateEntryRequest {
        title,
        content: content.to_string(),
        ..request.clone()
    })
}

/// Anonymous requests are limited to the acute help types and need content.
pub fn prepare_anonymous_request(content: &str, help_type: HelpType) -> ClientResult<CreateEntryRequest> {
    if help_type.requires_authentication() {
        return Err(ClientError::Auth(
            "Anonymous users can only use acute_validation or acute_skills. Please sign in for advanced features."
                .to_string(),
        ));
    }

    let content = content.trim();
    if content.is_empty() {
        return Err(ClientError::Validation("No content is present".to_string()));
    }

    Ok(CreateEntryRequest {
        content: content.to_string(),
        requested_help_type: Some(help_type),
        ..CreateEntryRequest::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_entry_trims_content_and_title() {
        let request = CreateEntryRequest {
            title: Some("   ".to_string()),
            content: "  A long day.\n".to_string(),
            requested_help_type: Some(HelpType::ChronicValidation),
            ..CreateEntryRequest::default()
        };

        let prepared = prepare_entry(&request).unwrap();
        assert_eq!(prepared.content, "A long day.");
        assert_eq!(prepared.title, None);
        assert_eq!(prepared.requested_help_type, Some(HelpType::ChronicValidation));
    }

    #[test]
    fn test_prepare_entry_rejects_blank_content() {
        let request = CreateEntryRequest {
            content: " \n\t".to_string(),
            ..CreateEntryRequest::default()
        };
        assert!(matches!(prepare_entry(&request), Err(ClientError::Validation(_))));
    }

    #[test]
    fn test_anonymous_request_limited_to_acute_types() {
        assert!(prepare_anonymous_request("I feel anxious today", HelpType::AcuteValidation).is_ok());
        assert!(prepare_anonymous_request("I need coping strategies", HelpType::AcuteSkills).is_ok());

        let result = prepare_anonymous_request("I want chronic help", HelpType::ChronicValidation);
        match result {
            Err(ClientError::Auth(message)) => assert!(message.contains("sign in for advanced features")),
            other => panic!("expected auth error, got {:?}", other),
        }
    }

    #[test]
    fn test_anonymous_request_needs_content() {
        let result = prepare_anonymous_request("", HelpType::AcuteValidation);
        assert_eq!(result, Err(ClientError::Validation("No content is present".to_string())));
    }
}
