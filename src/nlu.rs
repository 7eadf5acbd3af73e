//! Natural-language classification of user text.
//!
//! The classifier is an external collaborator behind a trait so the
//! dispatcher and tests can swap in stubs. The production adapter calls
//! Wit.ai's `/message` endpoint.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};

use crate::error::ClassifyError;

/// Trait and entity keys the dispatcher consults (Wit.ai naming).
pub const TRAIT_GREETINGS: &str = "wit$greetings";
pub const TRAIT_GET_STARTED: &str = "wit_started";
pub const TRAIT_THANKS: &str = "wit$thanks";
pub const TRAIT_BYE: &str = "wit$bye";
pub const ENTITY_DATETIME: &str = "wit$datetime:datetime";
pub const ENTITY_STORY: &str = "wit$agenda_entry:agenda_entry";

/// One ranked candidate match for an entity/intent/trait key.
#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    /// Matched value. Non-string values (datetime intervals) are kept as
    /// their JSON rendering; routing only checks presence.
    #[serde(default, deserialize_with = "value_as_string")]
    pub value: String,
    #[serde(default)]
    pub confidence: Option<f64>,
}

impl Candidate {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            confidence: None,
        }
    }
}

fn value_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// What the classifier detected in one piece of text.
#[derive(Debug, Clone, Default)]
pub struct ClassifierResult {
    pub entities: HashMap<String, Vec<Candidate>>,
    pub intents: HashMap<String, Vec<Candidate>>,
    pub traits: HashMap<String, Vec<Candidate>>,
}

impl ClassifierResult {
    pub fn first_entity(&self, key: &str) -> Option<&str> {
        first_value(&self.entities, key)
    }

    pub fn first_intent(&self, key: &str) -> Option<&str> {
        first_value(&self.intents, key)
    }

    pub fn first_trait(&self, key: &str) -> Option<&str> {
        first_value(&self.traits, key)
    }
}

/// First candidate value for a named key. Empty values count as absent.
pub fn first_value<'a>(map: &'a HashMap<String, Vec<Candidate>>, key: &str) -> Option<&'a str> {
    map.get(key)
        .and_then(|candidates| candidates.first())
        .map(|candidate| candidate.value.as_str())
        .filter(|value| !value.is_empty())
}

#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<ClassifierResult, ClassifyError>;
}

const WIT_API_URL: &str = "https://api.wit.ai/message";

/// Wit.ai adapter.
pub struct WitClassifier {
    token: SecretString,
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl WitClassifier {
    pub fn new(token: SecretString, timeout: Duration) -> Self {
        Self {
            token,
            client: reqwest::Client::new(),
            base_url: WIT_API_URL.to_string(),
            timeout,
        }
    }

    /// Point the adapter at a different endpoint (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl Classifier for WitClassifier {
    async fn classify(&self, text: &str) -> Result<ClassifierResult, ClassifyError> {
        let response = self
            .client
            .get(&self.base_url)
            .bearer_auth(self.token.expose_secret())
            .query(&[("q", text)])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(map_request_error)?;

        if !response.status().is_success() {
            return Err(ClassifyError::RequestFailed {
                reason: format!("status {}", response.status()),
            });
        }

        let raw: WitResponse =
            response
                .json()
                .await
                .map_err(|err| ClassifyError::InvalidResponse {
                    reason: err.to_string(),
                })?;
        Ok(raw.into_result())
    }
}

fn map_request_error(err: reqwest::Error) -> ClassifyError {
    if err.is_timeout() {
        ClassifyError::Timeout
    } else {
        ClassifyError::RequestFailed {
            reason: err.to_string(),
        }
    }
}

/// Wire shape of Wit's `/message` response. Intents come back as a
/// ranked list; entities and traits as maps of candidate lists.
#[derive(Debug, Deserialize)]
struct WitResponse {
    #[serde(default)]
    entities: HashMap<String, Vec<Candidate>>,
    #[serde(default)]
    traits: HashMap<String, Vec<Candidate>>,
    #[serde(default)]
    intents: Vec<WitIntent>,
}

#[derive(Debug, Deserialize)]
struct WitIntent {
    name: String,
    #[serde(default)]
    confidence: Option<f64>,
}

impl WitResponse {
    fn into_result(self) -> ClassifierResult {
        let mut intents: HashMap<String, Vec<Candidate>> = HashMap::new();
        for intent in self.intents {
            intents.entry(intent.name.clone()).or_default().push(Candidate {
                value: intent.name,
                confidence: intent.confidence,
            });
        }
        ClassifierResult {
            entities: self.entities,
            traits: self.traits,
            intents,
        }
    }
}

/// Stand-in used when no classifier token is configured. Every call
/// fails, so routing degrades to exact-text rules.
pub struct DisabledClassifier;

#[async_trait]
impl Classifier for DisabledClassifier {
    async fn classify(&self, _text: &str) -> Result<ClassifierResult, ClassifyError> {
        Err(ClassifyError::Disabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with_trait(key: &str, value: &str) -> ClassifierResult {
        let mut traits = HashMap::new();
        traits.insert(key.to_string(), vec![Candidate::new(value)]);
        ClassifierResult {
            traits,
            ..Default::default()
        }
    }

    #[test]
    fn first_value_returns_the_top_candidate() {
        let mut map = HashMap::new();
        map.insert(
            "wit$thanks".to_string(),
            vec![Candidate::new("true"), Candidate::new("second")],
        );
        assert_eq!(first_value(&map, "wit$thanks"), Some("true"));
    }

    #[test]
    fn first_value_ignores_missing_and_empty_keys() {
        let mut map: HashMap<String, Vec<Candidate>> = HashMap::new();
        assert_eq!(first_value(&map, "wit$bye"), None);

        map.insert("wit$bye".to_string(), vec![]);
        assert_eq!(first_value(&map, "wit$bye"), None);

        map.insert("wit$empty".to_string(), vec![Candidate::new("")]);
        assert_eq!(first_value(&map, "wit$empty"), None);
    }

    #[test]
    fn accessors_read_their_own_maps() {
        let result = result_with_trait(TRAIT_GREETINGS, "true");
        assert_eq!(result.first_trait(TRAIT_GREETINGS), Some("true"));
        assert_eq!(result.first_entity(TRAIT_GREETINGS), None);
        assert_eq!(result.first_intent(TRAIT_GREETINGS), None);
    }

    #[test]
    fn wit_response_normalizes_list_shaped_intents() {
        let raw: WitResponse = serde_json::from_str(
            r#"{
                "text": "hello there",
                "intents": [{"id": "1", "name": "greet", "confidence": 0.98}],
                "entities": {},
                "traits": {"wit$greetings": [{"id": "2", "value": "true", "confidence": 0.99}]}
            }"#,
        )
        .unwrap();
        let result = raw.into_result();
        assert_eq!(result.first_intent("greet"), Some("greet"));
        assert_eq!(result.first_trait(TRAIT_GREETINGS), Some("true"));
    }

    #[test]
    fn non_string_entity_values_deserialize_as_json_text() {
        let raw: WitResponse = serde_json::from_str(
            r#"{
                "entities": {
                    "wit$datetime:datetime": [
                        {"value": {"from": "2020-01-01", "to": "2020-02-01"}, "confidence": 0.9}
                    ]
                }
            }"#,
        )
        .unwrap();
        let result = raw.into_result();
        assert!(result.first_entity(ENTITY_DATETIME).is_some());
    }

    #[tokio::test]
    async fn disabled_classifier_always_fails() {
        let err = DisabledClassifier.classify("anything").await.unwrap_err();
        assert!(matches!(err, ClassifyError::Disabled));
    }
}
