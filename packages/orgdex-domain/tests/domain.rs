use orgdex_domain::{EntityType, ParseError, Role, Visibility, fuzzy, text};

#[test]
fn similarity_accepts_common_typos() {
	let score = fuzzy::similarity("robtics", "robotics");

	assert!((score - 0.875).abs() < 1e-9, "Unexpected similarity: {score}");
	assert!(score > 0.7);
}

#[test]
fn similarity_rejects_unrelated_words() {
	assert!(fuzzy::similarity("robot", "acme") < 0.7);
	assert!(fuzzy::similarity("robot", "robotics") < 0.7);
}

#[test]
fn levenshtein_counts_graphemes_not_bytes() {
	assert_eq!(fuzzy::levenshtein("café", "cafe"), 1);
	assert_eq!(fuzzy::levenshtein("", "abc"), 3);
	assert_eq!(fuzzy::levenshtein("kitten", "sitting"), 3);
	assert_eq!(fuzzy::similarity("", ""), 1.0);
}

#[test]
fn normalize_folds_case_width_and_whitespace() {
	assert_eq!(text::normalize("  Acme\tROBOTICS  "), "acme robotics");
	assert_eq!(text::normalize("Ｒｏｂｏｔ"), "robot");
}

#[test]
fn query_terms_are_unique_and_skip_short_terms() {
	let terms = text::query_terms("robot a arms, robot (ai)");

	assert_eq!(terms, vec!["robot".to_string(), "arms".to_string(), "ai".to_string()]);
}

#[test]
fn words_trim_surrounding_punctuation() {
	let words: Vec<&str> = text::words("Robots, drones & (autonomous) systems.").collect();

	assert_eq!(words, vec!["Robots", "drones", "autonomous", "systems"]);
}

#[test]
fn entity_types_round_trip_through_their_stored_value() {
	assert_eq!(EntityType::ALL.len(), 25);

	for kind in EntityType::ALL {
		assert_eq!(kind.as_str().parse::<EntityType>(), Ok(kind));
	}

	assert_eq!("Real Estate".parse::<EntityType>(), Ok(EntityType::RealEstate));
	assert_eq!(
		"spaceships".parse::<EntityType>(),
		Err(ParseError::UnknownEntityType("spaceships".to_string()))
	);
}

#[test]
fn roles_and_tiers_parse_case_insensitively() {
	assert_eq!(" Admin ".parse::<Role>(), Ok(Role::Admin));
	assert_eq!("MEMBER".parse::<Visibility>(), Ok(Visibility::Member));
	assert!("owner".parse::<Role>().is_err());
}

#[test]
fn only_members_and_cleared_roles_create() {
	assert!(!Role::Visitor.can_create());
	assert!(!Role::Subscriber.can_create());
	assert!(Role::Member.can_create());
	assert!(Role::Admin.can_create());
	assert!(Role::Confidential.can_create());
}
