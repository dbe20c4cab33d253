//! Edge cases and error handling for the anonymization engine

use scrubber::anonymization::{
    create_anonymization_engine, AnonymizationEngine, AnonymizeOptions, CustomRuleConfig,
    EngineConfig, Matcher, PiiCategory, Rule, Strategy,
};
use scrubber::domain::ScrubberError;
use test_case::test_case;

fn engine() -> AnonymizationEngine {
    create_anonymization_engine().expect("built-in rules compile")
}

#[tokio::test]
async fn test_credential_beats_lower_priority_rule_on_same_span() {
    let engine = engine();
    engine.register_rule(Rule::new(
        "generic_secret",
        PiiCategory::System,
        60,
        Matcher::pattern(r"secret[0-9]+").unwrap(),
        Strategy::Hash,
    ));

    let result = engine
        .anonymize("password: secret123", &AnonymizeOptions::default())
        .await
        .unwrap();
    assert_eq!(result.data, "password: [REDACTED]");
    assert_eq!(result.metadata.rules_applied, vec!["credential".to_string()]);

    // With the credential rule gone the generic rule takes the span
    engine.disable_rule("credential").unwrap();
    let result = engine
        .anonymize("password: secret123", &AnonymizeOptions::default())
        .await
        .unwrap();
    assert!(result.data.starts_with("password: hash_"));
    assert_eq!(
        result.metadata.rules_applied,
        vec!["generic_secret".to_string()]
    );

    engine.enable_rule("credential").unwrap();
    let result = engine
        .anonymize("password: secret123", &AnonymizeOptions::default())
        .await
        .unwrap();
    assert_eq!(result.data, "password: [REDACTED]");
}

#[tokio::test]
async fn test_timeout_fails_the_call_and_is_counted() {
    let engine = engine();
    let input = "admin@example.com 10.0.0.1 pve1.lab.internal ".repeat(200_000);
    let options = AnonymizeOptions {
        max_processing_time_ms: 1,
        ..AnonymizeOptions::default()
    };

    let err = engine.anonymize(&input, &options).await.unwrap_err();
    assert!(
        matches!(err, ScrubberError::ProcessingTimeout { limit_ms: 1, .. }),
        "unexpected error: {err}"
    );

    let stats = engine.stats();
    assert_eq!(stats.total_processed, 1);
    assert_eq!(stats.error_rate, 1.0);

    // The engine is still usable afterwards
    let ok = engine
        .anonymize("password: secret123", &AnonymizeOptions::default())
        .await
        .unwrap();
    assert_eq!(ok.data, "password: [REDACTED]");
    assert_eq!(engine.stats().error_rate, 0.5);
}

#[tokio::test]
async fn test_unknown_enabled_rule_is_a_configuration_error() {
    let engine = engine();
    let options = AnonymizeOptions::default().with_enabled_rules(["email", "no_such_rule"]);

    let err = engine.anonymize("a@b.io", &options).await.unwrap_err();
    match err {
        ScrubberError::Configuration(message) => assert!(message.contains("no_such_rule")),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(engine.stats().error_rate, 1.0);
}

#[test_case("" ; "empty")]
#[test_case("bad\u{0}salt" ; "control character")]
#[tokio::test]
async fn test_malformed_salt_is_rejected(salt: &str) {
    let engine = engine();
    let options = AnonymizeOptions::default().with_hash_salt(salt);

    let err = engine.anonymize("a@b.io", &options).await.unwrap_err();
    assert!(matches!(err, ScrubberError::Configuration(_)));
}

#[tokio::test]
async fn test_oversized_salt_is_rejected() {
    let engine = engine();
    let options = AnonymizeOptions::default().with_hash_salt("s".repeat(1024));
    assert!(engine.anonymize("a@b.io", &options).await.is_err());
}

#[tokio::test]
async fn test_zero_budget_is_rejected() {
    let engine = engine();
    let options = AnonymizeOptions {
        max_processing_time_ms: 0,
        ..AnonymizeOptions::default()
    };
    let err = engine.anonymize("a@b.io", &options).await.unwrap_err();
    assert!(matches!(err, ScrubberError::Configuration(_)));
}

#[tokio::test]
async fn test_no_active_rules() {
    let config = EngineConfig {
        disabled_rules: engine()
            .rules()
            .iter()
            .map(|(rule, _)| rule.id().to_string())
            .collect(),
        ..EngineConfig::default()
    };
    let engine = AnonymizationEngine::from_config(&config).unwrap();

    assert!(matches!(
        engine.detect_pii("a@b.io"),
        Err(ScrubberError::NoActiveRules)
    ));
    assert!(matches!(
        engine
            .anonymize("a@b.io", &AnonymizeOptions::default())
            .await,
        Err(ScrubberError::NoActiveRules)
    ));
}

#[tokio::test]
async fn test_broken_custom_rule_is_skipped() {
    let config = EngineConfig {
        custom_rules: vec![CustomRuleConfig {
            id: "broken".to_string(),
            category: PiiCategory::System,
            priority: 60,
            pattern: "vm-([0-9]+".to_string(),
            strategy: Strategy::Redact,
            format_preserving: None,
        }],
        ..EngineConfig::default()
    };
    let engine = AnonymizationEngine::from_config(&config).unwrap();

    let result = engine
        .anonymize("vm-100 at 10.0.0.1", &AnonymizeOptions::default())
        .await
        .unwrap();
    assert!(result.data.starts_with("vm-100 at "));
    assert!(!result.data.contains("10.0.0.1"));

    let stats = engine.stats();
    assert_eq!(stats.rule_failures, 1);
    assert_eq!(stats.error_rate, 0.0);

    let detection = engine.detect_pii("vm-100 at 10.0.0.1").unwrap();
    assert_eq!(detection.total_matches(), 1);
    assert_eq!(engine.stats().rule_failures, 2);
}

#[tokio::test]
async fn test_match_budget_skips_noisy_rule() {
    let config = EngineConfig {
        max_matches_per_rule: 5,
        ..EngineConfig::default()
    };
    let engine = AnonymizationEngine::from_config(&config).unwrap();
    let input = (1..=10)
        .map(|i| format!("10.0.0.{i}"))
        .collect::<Vec<_>>()
        .join(" ");

    let result = engine
        .anonymize(&input, &AnonymizeOptions::default())
        .await
        .unwrap();
    assert_eq!(result.data, input);
    assert_eq!(engine.stats().rule_failures, 1);
}

#[test_case(Strategy::Redact, "vm id [REDACTED]" ; "redact")]
#[test_case(Strategy::GenericPlaceholder, "vm id [SYSTEM]" ; "placeholder")]
#[tokio::test]
async fn test_custom_rule_strategies(strategy: Strategy, expected: &str) {
    let config = EngineConfig {
        custom_rules: vec![CustomRuleConfig {
            id: "vmid".to_string(),
            category: PiiCategory::System,
            priority: 65,
            pattern: r"\bvm-[0-9]{3,}\b".to_string(),
            strategy,
            format_preserving: None,
        }],
        ..EngineConfig::default()
    };
    let engine = AnonymizationEngine::from_config(&config).unwrap();

    let result = engine
        .anonymize("vm id vm-1234", &AnonymizeOptions::default())
        .await
        .unwrap();
    assert_eq!(result.data, expected);
}

#[tokio::test]
async fn test_hash_strategy_is_fixed_length_and_stable() {
    let engine = engine();
    let options = AnonymizeOptions::default();

    let a = engine
        .anonymize("hwaddr 52:54:00:12:34:56", &options)
        .await
        .unwrap();
    let b = engine
        .anonymize("hwaddr 52:54:00:12:34:56", &options)
        .await
        .unwrap();
    assert_eq!(a.data, b.data);

    let token = a.data.trim_start_matches("hwaddr ");
    assert!(token.starts_with("hash_"));
    assert_eq!(token.len(), "hash_".len() + 16);
    assert!(engine.list_mappings().is_empty());
}

#[tokio::test]
async fn test_multibyte_text_around_matches() {
    let engine = engine();
    let input = "Grüße an ünïcødé admin@example.com · 東京 10.0.0.1 ✓";

    let result = engine
        .anonymize(input, &AnonymizeOptions::default())
        .await
        .unwrap();
    assert!(result.data.starts_with("Grüße an ünïcødé "));
    assert!(result.data.ends_with(" ✓"));
    assert!(result.data.contains(" · 東京 "));
    assert!(!result.data.contains("admin@example.com"));
    assert!(!result.data.contains("10.0.0.1"));
}

#[tokio::test]
async fn test_unknown_rule_ids_on_registry_ops() {
    let engine = engine();
    assert!(matches!(
        engine.disable_rule("nope"),
        Err(ScrubberError::Configuration(_))
    ));
    assert!(engine.enable_rule("nope").is_err());
}

#[tokio::test]
async fn test_pseudonyms_disabled_redacts_pseudonym_rules() {
    let engine = engine();
    let options = AnonymizeOptions {
        enable_pseudonyms: false,
        ..AnonymizeOptions::default()
    };
    let result = engine
        .anonymize("Contact admin@example.com for help", &options)
        .await
        .unwrap();
    assert_eq!(result.data, "Contact [REDACTED] for help");
    assert_eq!(result.metadata.pseudonyms_used, 0);
    assert!(engine.list_mappings().is_empty());
}

#[test_case("email", "Contact admin@example.com for help" ; "email")]
#[test_case("ipv4", "Server at 192.168.1.1" ; "ipv4")]
#[test_case("ipv6", "link fe80::1ff:fe23:4567:890a up" ; "ipv6")]
#[test_case("username", "username: deploy" ; "username")]
#[test_case("hostname", "ssh to pve1.lab.internal now" ; "hostname")]
#[test_case("uuid", "vm 550e8400-e29b-41d4-a716-446655440000" ; "uuid")]
#[test_case("filepath", "see /home/alice/.ssh/config" ; "unix path")]
#[test_case("filepath", r"at C:\Users\alice\notes.txt" ; "windows path")]
#[tokio::test]
async fn test_shaped_pseudonym_is_detected_by_its_own_rule(rule_id: &str, input: &str) {
    let engine = engine();
    let original = engine.detect_pii(input).unwrap().locations[0].value.clone();

    let result = engine
        .anonymize(input, &AnonymizeOptions::default())
        .await
        .unwrap();
    assert!(!result.data.contains(&original));
    assert_eq!(result.metadata.rules_applied, vec![rule_id.to_string()]);

    let pseudonym = engine
        .list_mappings()
        .into_iter()
        .find(|m| m.original_value == original)
        .map(|m| m.pseudonym)
        .unwrap();
    let redetected = engine.detect_pii(&result.data).unwrap();
    assert!(
        redetected
            .locations
            .iter()
            .any(|m| m.rule_id == rule_id && m.value == pseudonym),
        "{pseudonym:?} not detected as {rule_id}: {:?}",
        redetected.locations
    );
}
