pub mod scoring;

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::{
	DirectoryService, Error, Result, access,
	query::{self, DirectoryFilters},
	search::scoring::{RelevanceScorer, SearchResult},
};
use orgdex_domain::{Caller, Entity, EntityType};
use orgdex_storage::query::Pagination;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
	pub query: String,
	pub types: Vec<EntityType>,
	pub location: Option<String>,
	pub max_results: Option<u32>,
	pub fuzzy: Option<bool>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SearchResponse {
	pub results: Vec<SearchResult>,
	/// Scored hits before truncation to `max_results`.
	pub total_results: usize,
	pub search_time_ms: f64,
	pub candidate_count: usize,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub suggestions: Option<Vec<String>>,
}

impl DirectoryService {
	pub async fn search(
		&self,
		caller: Option<&Caller>,
		req: SearchRequest,
	) -> Result<SearchResponse> {
		const OPERATION: &str = "search";

		let started = Instant::now();
		let role = access::require_caller(caller, OPERATION)?.role;
		let fuzzy = req.fuzzy.unwrap_or(self.cfg.search.fuzzy_default);
		let scorer = RelevanceScorer::new(&req.query, req.location.as_deref(), fuzzy);

		if !scorer.accepts_query() {
			return Err(Error::validation(vec!["query".to_string()]));
		}

		let max_candidates = self.cfg.search.max_candidates;
		let max_results =
			req.max_results.unwrap_or(self.cfg.search.default_max_results).clamp(1, max_candidates);
		let candidate_limit = max_results.saturating_mul(2).min(max_candidates);
		// A single type is pushed down; several are applied after the fetch.
		let filters = match req.types.as_slice() {
			[only] => DirectoryFilters { entity_type: Some(*only), ..Default::default() },
			_ => DirectoryFilters::default(),
		};
		let pagination = Pagination { limit: Some(candidate_limit), ..Default::default() };
		let descriptor = query::build(role, &filters, None, pagination)?;
		let candidates = match self.snapshot_for(role).await {
			Some(snapshot) => descriptor.apply(snapshot.entities().iter().cloned()),
			None => self
				.store
				.query(&descriptor)
				.await
				.map_err(|err| Error::query(OPERATION, role, err))?,
		};
		let candidates = crate::retain_visible(candidates, role, OPERATION)
			.into_iter()
			.filter(|entity| matches_types(entity, &req.types))
			.collect::<Vec<_>>();
		let candidate_count = candidates.len();
		let mut results = candidates
			.iter()
			.map(|entity| scorer.score(entity))
			.filter(|result| result.relevance_score > 0.0)
			.collect::<Vec<_>>();

		// Stable sort: equal scores keep candidate order.
		results.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));

		let total_results = results.len();

		results.truncate(max_results as usize);

		let suggestions = scoring::suggestions(total_results);
		let search_time_ms = started.elapsed().as_secs_f64() * 1_000.0;

		tracing::debug!(
			role = %role,
			candidates = candidate_count,
			total_results,
			search_time_ms,
			"Search completed."
		);

		Ok(SearchResponse { results, total_results, search_time_ms, candidate_count, suggestions })
	}
}

fn matches_types(entity: &Entity, types: &[EntityType]) -> bool {
	types.len() <= 1 || types.contains(&entity.entity_type)
}
