/// Record validation module
///
/// Validates raw review, user, and liked-game documents before they are
/// written to the store
use crate::error::ShelfError;
use serde_json::Value;
use std::collections::HashMap;

pub const REVIEW: &str = "review";
pub const USER: &str = "user";
pub const LIKED_GAME: &str = "likedGame";

const MAX_REVIEW_BODY: usize = 10_000;
const MAX_RATING: u64 = 5;

// Field names paired with the legacy names that deserialize into them
const REVIEW_ALIASES: &[(&str, &str)] = &[
    ("actorId", "userId"),
    ("actorDisplayName", "username"),
    ("subjectId", "gameId"),
    ("subjectName", "gameName"),
    ("body", "text"),
];
const USER_ALIASES: &[(&str, &str)] = &[("displayName", "username")];
const LIKED_GAME_ALIASES: &[(&str, &str)] = &[("id", "gameId")];

/// Validation error detail
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

/// Validation result with detailed errors
pub type ValidationResult = Result<(), Vec<ValidationError>>;

type ValidatorFn = Box<dyn Fn(&Value) -> ValidationResult + Send + Sync>;

/// Record validator
pub struct RecordValidator {
    /// Kind-specific validators
    validators: HashMap<String, ValidatorFn>,
}

impl Default for RecordValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordValidator {
    /// Create a new record validator
    pub fn new() -> Self {
        let mut validator = Self {
            validators: HashMap::new(),
        };

        validator.register(REVIEW, Box::new(|record: &Value| validate_review(record, "$")));
        validator.register(USER, Box::new(validate_user));
        validator.register(LIKED_GAME, Box::new(|record: &Value| validate_liked_game(record, "$")));

        validator
    }

    fn register(&mut self, kind: &str, validator: ValidatorFn) {
        self.validators.insert(kind.to_string(), validator);
    }

    /// Validate a record against its kind
    pub fn validate(&self, kind: &str, record: &Value) -> ValidationResult {
        if !record.is_object() {
            return Err(vec![ValidationError {
                path: "$".to_string(),
                message: "Record must be an object".to_string(),
            }]);
        }

        match self.validators.get(kind) {
            Some(validator_fn) => validator_fn(record),
            None => Err(vec![ValidationError {
                path: "$".to_string(),
                message: format!("Unknown record kind '{}'", kind),
            }]),
        }
    }
}

/// Collapse validation errors into one `ShelfError::Validation`
pub fn into_shelf_error(kind: &str, errors: Vec<ValidationError>) -> ShelfError {
    let details: Vec<String> = errors
        .iter()
        .map(|e| format!("{}: {}", e.path, e.message))
        .collect();
    ShelfError::Validation(format!("Invalid {}: {}", kind, details.join("; ")))
}

fn require_string(record: &Value, field: &str, base: &str, errors: &mut Vec<ValidationError>) {
    match record.get(field) {
        None | Some(Value::Null) => errors.push(ValidationError {
            path: format!("{}.{}", base, field),
            message: format!("Required field '{}' is missing", field),
        }),
        Some(Value::String(s)) if s.trim().is_empty() => errors.push(ValidationError {
            path: format!("{}.{}", base, field),
            message: format!("Field '{}' cannot be empty", field),
        }),
        Some(Value::String(_)) => {}
        Some(_) => errors.push(ValidationError {
            path: format!("{}.{}", base, field),
            message: format!("Field '{}' must be a string", field),
        }),
    }
}

/// A document may use a field or its legacy name, never both
fn reject_aliased_pairs(
    record: &Value,
    base: &str,
    pairs: &[(&str, &str)],
    errors: &mut Vec<ValidationError>,
) {
    for (field, alias) in pairs {
        if record.get(field).is_some() && record.get(alias).is_some() {
            errors.push(ValidationError {
                path: format!("{}.{}", base, alias),
                message: format!("Fields '{}' and '{}' cannot both be set", field, alias),
            });
        }
    }
}

fn finish(errors: Vec<ValidationError>) -> ValidationResult {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_review(record: &Value, base: &str) -> ValidationResult {
    let mut errors = Vec::new();
    reject_aliased_pairs(record, base, REVIEW_ALIASES, &mut errors);

    // Accept the legacy userId alias
    if record.get("actorId").is_some() || record.get("userId").is_none() {
        require_string(record, "actorId", base, &mut errors);
    } else {
        require_string(record, "userId", base, &mut errors);
    }

    // Ratings are whole stars, 0 to 5
    if let Some(rating) = record.get("rating") {
        match rating.as_u64() {
            Some(r) if r <= MAX_RATING => {}
            _ => errors.push(ValidationError {
                path: format!("{}.rating", base),
                message: format!("Rating must be an integer from 0 to {}: {}", MAX_RATING, rating),
            }),
        }
    }

    if let Some(body) = record.get("body").or_else(|| record.get("text")) {
        match body.as_str() {
            Some(s) if s.chars().count() > MAX_REVIEW_BODY => errors.push(ValidationError {
                path: format!("{}.body", base),
                message: format!(
                    "Body exceeds maximum of {} characters: {}",
                    MAX_REVIEW_BODY,
                    s.chars().count()
                ),
            }),
            Some(_) => {}
            None => errors.push(ValidationError {
                path: format!("{}.body", base),
                message: "Field 'body' must be a string".to_string(),
            }),
        }
    }

    if let Some(spoilers) = record.get("containsSpoilers") {
        if !spoilers.is_boolean() {
            errors.push(ValidationError {
                path: format!("{}.containsSpoilers", base),
                message: "Field 'containsSpoilers' must be a boolean".to_string(),
            });
        }
    }

    finish(errors)
}

fn validate_liked_game(record: &Value, base: &str) -> ValidationResult {
    let mut errors = Vec::new();
    reject_aliased_pairs(record, base, LIKED_GAME_ALIASES, &mut errors);
    require_string(record, "name", base, &mut errors);
    finish(errors)
}

fn validate_user(record: &Value) -> ValidationResult {
    let mut errors = Vec::new();
    reject_aliased_pairs(record, "$", USER_ALIASES, &mut errors);
    require_string(record, "id", "$", &mut errors);

    if let Some(games) = record.get("likedGames") {
        match games.as_array() {
            Some(games) => {
                for (i, game) in games.iter().enumerate() {
                    let path = format!("$.likedGames[{}]", i);
                    if !game.is_object() {
                        errors.push(ValidationError {
                            path,
                            message: "Liked game must be an object".to_string(),
                        });
                    } else if let Err(mut game_errors) = validate_liked_game(game, &path) {
                        errors.append(&mut game_errors);
                    }
                }
            }
            None => errors.push(ValidationError {
                path: "$.likedGames".to_string(),
                message: "Field 'likedGames' must be an array".to_string(),
            }),
        }
    }

    if let Some(following) = record.get("following") {
        match following.as_array() {
            Some(ids) => {
                for (i, id) in ids.iter().enumerate() {
                    if !id.is_string() {
                        errors.push(ValidationError {
                            path: format!("$.following[{}]", i),
                            message: "Followed user id must be a string".to_string(),
                        });
                    }
                }
            }
            None => errors.push(ValidationError {
                path: "$.following".to_string(),
                message: "Field 'following' must be an array".to_string(),
            }),
        }
    }

    finish(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_review_valid() {
        let validator = RecordValidator::new();

        let review = json!({
            "actorId": "u1",
            "subjectName": "Portal",
            "rating": 5,
            "body": "Great",
            "containsSpoilers": false,
            "createdAt": "2024-01-03T00:00:00Z"
        });

        assert!(validator.validate(REVIEW, &review).is_ok());
    }

    #[test]
    fn test_validate_review_user_id_alias() {
        let validator = RecordValidator::new();
        let review = json!({ "userId": "u1", "rating": 0 });
        assert!(validator.validate(REVIEW, &review).is_ok());
    }

    #[test]
    fn test_validate_review_field_and_legacy_name_rejected() {
        let validator = RecordValidator::new();
        let review = json!({ "actorId": "u1", "userId": "u2", "rating": 3 });

        let errors = validator.validate(REVIEW, &review).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "$.userId");

        let review = json!({ "actorId": "u1", "body": "a", "text": "b" });
        assert!(validator.validate(REVIEW, &review).is_err());
    }

    #[test]
    fn test_validate_user_field_and_legacy_name_rejected() {
        let validator = RecordValidator::new();
        let user = json!({
            "id": "u1",
            "displayName": "One",
            "likedGames": [{ "id": "g1", "gameId": "g1", "name": "Celeste" }]
        });

        let errors = validator.validate(USER, &user).unwrap_err();
        let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["$.likedGames[0].gameId"]);
    }

    #[test]
    fn test_validate_review_missing_actor() {
        let validator = RecordValidator::new();

        let result = validator.validate(REVIEW, &json!({ "rating": 3 }));

        if let Err(errors) = result {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].path, "$.actorId");
        } else {
            panic!("expected errors");
        }
    }

    #[test]
    fn test_validate_review_rating_range() {
        let validator = RecordValidator::new();

        for rating in [json!(6), json!(-1), json!(2.5), json!("5")] {
            let review = json!({ "actorId": "u1", "rating": rating });
            let errors = validator.validate(REVIEW, &review).unwrap_err();
            assert!(errors.iter().any(|e| e.path == "$.rating"));
        }
    }

    #[test]
    fn test_validate_review_body_too_long() {
        let validator = RecordValidator::new();
        let review = json!({ "actorId": "u1", "body": "a".repeat(MAX_REVIEW_BODY + 1) });
        assert!(validator.validate(REVIEW, &review).is_err());
    }

    #[test]
    fn test_validate_user_nested_games() {
        let validator = RecordValidator::new();

        let user = json!({
            "id": "u1",
            "likedGames": [{ "name": "Celeste" }, { "likedAt": 1 }, "Hades"],
            "following": ["u2", 3]
        });

        let errors = validator.validate(USER, &user).unwrap_err();
        let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["$.likedGames[1].name", "$.likedGames[2]", "$.following[1]"]);
    }

    #[test]
    fn test_non_object_and_unknown_kind() {
        let validator = RecordValidator::new();
        assert!(validator.validate(REVIEW, &json!([1])).is_err());
        assert!(validator.validate("collection", &json!({})).is_err());
    }

    #[test]
    fn test_into_shelf_error() {
        let err = into_shelf_error(
            REVIEW,
            vec![ValidationError {
                path: "$.rating".to_string(),
                message: "bad".to_string(),
            }],
        );
        assert!(err.to_string().contains("$.rating: bad"));
    }
}
