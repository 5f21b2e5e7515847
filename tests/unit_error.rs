use taskdeck::error::{exit_codes, Error, JsonError};
use uuid::Uuid;

#[test]
fn exit_codes_map_correctly() {
    let user = Error::InvalidArgument("bad".to_string());
    assert_eq!(user.exit_code(), exit_codes::USER_ERROR);

    let credentials = Error::InvalidCredentials;
    assert_eq!(credentials.exit_code(), exit_codes::USER_ERROR);

    let missing = Error::TaskNotFound(Uuid::new_v4());
    assert_eq!(missing.exit_code(), exit_codes::USER_ERROR);

    let service = Error::Service("boom".to_string());
    assert_eq!(service.exit_code(), exit_codes::OPERATION_FAILED);
}

#[test]
fn json_error_includes_code_and_kind() {
    let err = Error::NotAuthenticated;
    let json = JsonError::from(&err);
    assert_eq!(json.code, exit_codes::USER_ERROR);
    assert_eq!(json.kind, "not_authenticated");
    assert!(json.error.contains("Not authenticated"));
}

#[test]
fn task_not_found_names_the_id() {
    let id = Uuid::new_v4();
    let err = Error::TaskNotFound(id);
    assert!(err.to_string().contains(&id.to_string()));
    assert_eq!(err.kind(), "task_not_found");
}
