//! Request Validation Tests
//!
//! The request DTOs carry the first line of input validation; these
//! tests pin the rules clients are told about in the API docs.

use chrono::NaiveDate;
use test_case::test_case;
use validator::Validate;

use campus_match::application::dto::request::{
    AnswerPromptRequest, RegisterRequest, SendMessageRequest, SetInterestsRequest,
    UpdateSettingsRequest,
};

use crate::common::{unique_email, unique_name};

fn valid_register() -> RegisterRequest {
    RegisterRequest {
        email: unique_email(),
        password: "correct-horse-battery".into(),
        name: unique_name(),
        birthdate: NaiveDate::from_ymd_opt(2004, 9, 21).unwrap(),
        gender: Some("woman".into()),
        seeking: Some("everyone".into()),
        campus: Some("North Campus".into()),
    }
}

#[test]
fn valid_registration_passes() {
    assert!(valid_register().validate().is_ok());
}

#[test_case("not-an-email" ; "no at sign")]
#[test_case("@campus.test" ; "no local part")]
#[test_case("student@" ; "no domain")]
#[test_case("" ; "empty")]
fn bad_email_is_rejected(email: &str) {
    let mut req = valid_register();
    req.email = email.into();
    assert!(req.validate().is_err());
}

#[test]
fn short_password_is_rejected() {
    let mut req = valid_register();
    req.password = "short".into();
    assert!(req.validate().is_err());
}

#[test]
fn one_char_name_is_rejected() {
    let mut req = valid_register();
    req.name = "A".into();
    assert!(req.validate().is_err());
}

#[test]
fn message_length_bounds() {
    let empty = SendMessageRequest { content: "".into() };
    assert!(empty.validate().is_err());

    let too_long = SendMessageRequest {
        content: "x".repeat(2001),
    };
    assert!(too_long.validate().is_err());

    let fine = SendMessageRequest {
        content: "see you at the library?".into(),
    };
    assert!(fine.validate().is_ok());
}

#[test]
fn more_than_ten_interests_rejected() {
    let req = SetInterestsRequest {
        interest_ids: (1..=11).collect(),
    };
    assert!(req.validate().is_err());
}

#[test]
fn prompt_answer_capped_at_300_chars() {
    let req = AnswerPromptRequest {
        answer: "y".repeat(301),
    };
    assert!(req.validate().is_err());
}

#[test]
fn settings_age_range_is_bounded() {
    let req = UpdateSettingsRequest {
        discovery_enabled: None,
        min_age: Some(17),
        max_age: None,
        show_me: None,
        notify_matches: None,
        notify_messages: None,
    };
    assert!(req.validate().is_err());
}
