//! Weighted multi-field relevance scoring with fuzzy and industry-compatibility bonuses.

use serde::Serialize;

use orgdex_domain::{
	Entity, fuzzy,
	text::{self, MIN_TERM_GRAPHEMES},
};

pub const EXACT_QUERY_MULTIPLIER: f64 = 3.0;
pub const FUZZY_THRESHOLD: f64 = 0.7;
pub const FUZZY_WEIGHT: f64 = 0.5;
pub const MIN_FUZZY_WORD_GRAPHEMES: usize = 3;
pub const LOCATION_BONUS: f64 = 15.0;
pub const INDUSTRY_KEYWORD_HIT: f64 = 0.3;
pub const INDUSTRY_SERVICE_HIT: f64 = 0.2;
pub const INDUSTRY_WEIGHT: f64 = 2.0;
pub const CERTIFICATION_BOOST: f64 = 1.2;
pub const PARTNERSHIP_BOOST: f64 = 1.1;
pub const MAX_MATCH_REASONS: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SearchField {
	Name,
	Services,
	Industries,
	/// Entity type label and enum words. Only matched fuzzily; exact hits count toward
	/// industry compatibility instead.
	Type,
	Location,
	Tags,
	ShortDescription,
	FullDescription,
}
impl SearchField {
	/// Ordered by weight, highest first, so reasons come out in weight order.
	const BY_WEIGHT: [Self; 8] = [
		Self::Name,
		Self::Industries,
		Self::Type,
		Self::Services,
		Self::ShortDescription,
		Self::Location,
		Self::Tags,
		Self::FullDescription,
	];

	fn weight(self) -> f64 {
		match self {
			Self::Name => 10.0,
			Self::Services => 6.0,
			Self::Industries | Self::Type => 7.0,
			Self::Location => 4.0,
			Self::Tags => 4.0,
			Self::ShortDescription => 5.0,
			Self::FullDescription => 3.0,
		}
	}

	fn label(self) -> &'static str {
		match self {
			Self::Name => "Name",
			Self::Services => "Services",
			Self::Industries => "Industries",
			Self::Type => "Type",
			Self::Location => "Location",
			Self::Tags => "Tags",
			Self::ShortDescription => "Summary",
			Self::FullDescription => "Description",
		}
	}

	fn text_of(self, entity: &Entity) -> Option<String> {
		let raw = match self {
			Self::Name => entity.name.clone(),
			Self::Services => entity.services.join(" "),
			Self::Industries => entity.industries.join(" "),
			Self::Type => type_words(entity),
			Self::Location => entity.location.clone()?,
			Self::Tags => entity.tags.join(" "),
			Self::ShortDescription => entity.short_description.clone(),
			Self::FullDescription => entity.full_description.clone()?,
		};
		let normalized = text::normalize(&raw);

		(!normalized.is_empty()).then_some(normalized)
	}
}

/// One ranked hit. Not persisted.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SearchResult {
	pub entity: Entity,
	pub relevance_score: f64,
	pub match_reasons: Vec<String>,
	pub industry_compatibility: f64,
}

#[derive(Clone, Debug)]
pub struct RelevanceScorer {
	query: String,
	terms: Vec<String>,
	location: Option<String>,
	fuzzy: bool,
}
impl RelevanceScorer {
	pub fn new(query: &str, location: Option<&str>, fuzzy: bool) -> Self {
		let query = text::normalize(query);
		let terms = text::query_terms(&query);
		let location = location.map(text::normalize).filter(|location| !location.is_empty());

		Self { query, terms, location, fuzzy }
	}

	pub fn query(&self) -> &str {
		&self.query
	}

	pub fn terms(&self) -> &[String] {
		&self.terms
	}

	pub fn accepts_query(&self) -> bool {
		text::grapheme_len(&self.query) >= MIN_TERM_GRAPHEMES
	}

	pub fn score(&self, entity: &Entity) -> SearchResult {
		if !self.accepts_query() {
			return SearchResult {
				entity: entity.clone(),
				relevance_score: 0.0,
				match_reasons: Vec::new(),
				industry_compatibility: 0.0,
			};
		}

		let mut score = 0.0;
		let mut match_reasons = Vec::new();

		for field in SearchField::BY_WEIGHT {
			let Some(text) = field.text_of(entity) else {
				continue;
			};
			let (field_score, reason) = self.score_field(field, &text);

			score += field_score;

			if let Some(reason) = reason
				&& match_reasons.len() < MAX_MATCH_REASONS
			{
				match_reasons.push(reason);
			}
		}

		if let Some(filter) = self.location.as_deref()
			&& entity
				.location
				.as_deref()
				.is_some_and(|location| text::normalize(location).contains(filter))
		{
			score += LOCATION_BONUS;
		}

		let industry_compatibility = self.industry_compatibility(entity);

		score += industry_compatibility * INDUSTRY_WEIGHT;

		if entity.has_certifications() {
			score *= CERTIFICATION_BOOST;
		}
		if entity.has_partnerships() {
			score *= PARTNERSHIP_BOOST;
		}

		SearchResult {
			entity: entity.clone(),
			relevance_score: round2(score),
			match_reasons,
			industry_compatibility: round2(industry_compatibility),
		}
	}

	fn score_field(&self, field: SearchField, text: &str) -> (f64, Option<String>) {
		let weight = field.weight();
		let label = field.label();
		let mut score = 0.0;
		let mut reason = None;

		if field == SearchField::Type {
			if self.fuzzy {
				self.score_fuzzy(field, text, &mut score, &mut reason);
			}

			return (score, reason);
		}
		if text.contains(self.query.as_str()) {
			score += weight * EXACT_QUERY_MULTIPLIER;
			reason = Some(format!("{label} contains \"{}\"", self.query));
		}

		for term in &self.terms {
			if text.contains(term.as_str()) {
				score += weight;

				reason.get_or_insert_with(|| format!("{label} matches \"{term}\""));
			}
		}

		if self.fuzzy {
			self.score_fuzzy(field, text, &mut score, &mut reason);
		}

		(score, reason)
	}

	fn score_fuzzy(
		&self,
		field: SearchField,
		text: &str,
		score: &mut f64,
		reason: &mut Option<String>,
	) {
		let weight = field.weight();
		let label = field.label();

		for term in &self.terms {
			for word in text::words(text) {
				if text::grapheme_len(word) < MIN_FUZZY_WORD_GRAPHEMES {
					continue;
				}

				let similarity = fuzzy::similarity(term, word);

				if similarity > FUZZY_THRESHOLD {
					*score += weight * similarity * FUZZY_WEIGHT;

					reason.get_or_insert_with(|| {
						format!("{label} is similar to \"{term}\" ({word})")
					});
				}
			}
		}
	}

	/// Per term: keyword hits against the type label, description and enum value, plus hits
	/// against each service. Capped at 1.
	fn industry_compatibility(&self, entity: &Entity) -> f64 {
		let entity_type = entity.entity_type;
		let keywords = [
			text::normalize(entity_type.label()),
			text::normalize(entity_type.description()),
			entity_type.as_str().to_string(),
		];
		let services =
			entity.services.iter().map(|service| text::normalize(service)).collect::<Vec<_>>();
		let mut compatibility = 0.0;

		for term in &self.terms {
			for keyword in &keywords {
				if keyword.contains(term.as_str()) {
					compatibility += INDUSTRY_KEYWORD_HIT;
				}
			}
			for service in &services {
				if service.contains(term.as_str()) {
					compatibility += INDUSTRY_SERVICE_HIT;
				}
			}
		}

		f64::min(compatibility, 1.0)
	}
}

/// Unique words of the type label and enum value, so `robotics` is not counted twice.
fn type_words(entity: &Entity) -> String {
	let entity_type = entity.entity_type;
	let raw = format!("{} {}", entity_type.label(), entity_type.as_str().replace('_', " "));
	let normalized = text::normalize(&raw);
	let mut words: Vec<&str> = Vec::new();

	for word in text::words(&normalized) {
		if !words.contains(&word) {
			words.push(word);
		}
	}

	words.join(" ")
}

pub fn suggestions(result_count: usize) -> Option<Vec<String>> {
	match result_count {
		0 => Some(vec![
			"Try broader or fewer search terms.".to_string(),
			"Check the spelling of your search terms.".to_string(),
			"Remove type or location filters.".to_string(),
		]),
		1..=4 => Some(vec!["Try broadening your search to see more results.".to_string()]),
		_ => None,
	}
}

fn round2(value: f64) -> f64 {
	(value * 100.0).round() / 100.0
}
