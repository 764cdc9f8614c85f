mod support;

use std::sync::{Arc, atomic::Ordering};

use uuid::Uuid;

use orgdex_config::CachePhase;
use orgdex_domain::{EntityType, Role, Visibility};
use orgdex_service::{DirectoryFilters, DirectoryService, Error, ListRequest, SortRequest};

use support::{FlakyStore, caller, config, entity, live_service, with_visibility};

fn tiered_catalog() -> Vec<orgdex_domain::Entity> {
	vec![
		with_visibility(entity("Public Co", EntityType::Retail, 1), Visibility::Public, false),
		with_visibility(entity("Sub Co", EntityType::Retail, 2), Visibility::Subscriber, false),
		with_visibility(entity("Member Co", EntityType::Retail, 3), Visibility::Member, false),
		with_visibility(entity("Secret Co", EntityType::Defense, 4), Visibility::Public, true),
	]
}

fn names(entities: &[orgdex_domain::Entity]) -> Vec<&str> {
	entities.iter().map(|entity| entity.name.as_str()).collect()
}

#[tokio::test]
async fn list_for_role_respects_tiers() {
	let (service, _) = live_service(tiered_catalog());
	let expectations = [
		(Role::Visitor, vec!["Public Co"]),
		(Role::Subscriber, vec!["Public Co", "Sub Co"]),
		(Role::Member, vec!["Public Co", "Sub Co", "Member Co"]),
		(Role::Admin, vec!["Public Co", "Sub Co", "Member Co", "Secret Co"]),
		(Role::Confidential, vec!["Public Co", "Sub Co", "Member Co", "Secret Co"]),
	];

	for (role, expected) in expectations {
		let response = service
			.list_for_role(Some(&caller("u1", role)), ListRequest::default())
			.await
			.expect("List should succeed.");

		assert_eq!(names(&response.entities), expected, "role {role}");
		assert_eq!(
			response.last_visible_id,
			response.entities.last().map(|entity| entity.id),
			"role {role}"
		);
	}
}

#[tokio::test]
async fn list_requires_a_caller() {
	let (service, _) = live_service(tiered_catalog());
	let result = service.list_for_role(None, ListRequest::default()).await;

	assert!(matches!(result, Err(Error::Auth { .. })));
}

#[tokio::test]
async fn cursor_pages_neither_skip_nor_repeat() {
	let catalog = (0..7)
		.map(|i| entity(&format!("Org {i}"), EntityType::Software, i / 2))
		.collect::<Vec<_>>();
	let (service, _) = live_service(catalog);
	let member = caller("u1", Role::Member);
	let mut seen = Vec::new();
	let mut start_after = None;

	loop {
		let response = service
			.list_for_role(
				Some(&member),
				ListRequest { limit: Some(3), start_after, ..Default::default() },
			)
			.await
			.expect("List should succeed.");

		if response.entities.is_empty() {
			break;
		}

		seen.extend(response.entities.iter().map(|entity| entity.id));

		start_after = response.last_visible_id;
	}

	let mut unique = seen.clone();

	unique.sort();
	unique.dedup();

	assert_eq!(seen.len(), 7);
	assert_eq!(unique.len(), 7);
}

#[tokio::test]
async fn unknown_cursor_restarts_from_the_first_page() {
	let (service, _) = live_service(tiered_catalog());
	let admin = caller("u1", Role::Admin);
	let first = service
		.list_for_role(Some(&admin), ListRequest::default())
		.await
		.expect("List should succeed.");
	let restarted = service
		.list_for_role(
			Some(&admin),
			ListRequest { start_after: Some(Uuid::new_v4()), ..Default::default() },
		)
		.await
		.expect("Unknown cursors must not fail the call.");

	assert_eq!(names(&first.entities), names(&restarted.entities));
}

#[tokio::test]
async fn hidden_cursor_rows_are_treated_as_unknown() {
	let catalog = tiered_catalog();
	let secret_id = catalog[3].id;
	let (service, _) = live_service(catalog);
	let visitor = caller("u1", Role::Visitor);
	let first = service
		.list_for_role(Some(&visitor), ListRequest::default())
		.await
		.expect("List should succeed.");
	let anchored = service
		.list_for_role(
			Some(&visitor),
			ListRequest { start_after: Some(secret_id), ..Default::default() },
		)
		.await
		.expect("Hidden cursors must not fail the call.");

	// The confidential row is the oldest, so honoring it as a cursor would yield nothing.
	assert_eq!(names(&first.entities), vec!["Public Co"]);
	assert_eq!(names(&anchored.entities), names(&first.entities));
}

#[tokio::test]
async fn unsupported_sort_field_fails_fast() {
	let (service, _) = live_service(tiered_catalog());
	let request = ListRequest {
		sort: Some(SortRequest { field: "popularity".to_string(), direction: None }),
		..Default::default()
	};
	let result = service.list_for_role(Some(&caller("u1", Role::Member)), request).await;

	assert!(matches!(result, Err(Error::Query { .. })));
}

#[tokio::test]
async fn sort_and_filters_are_honored_with_totals() {
	let mut small = entity("Small", EntityType::Software, 1);
	let mut large = entity("Large", EntityType::Software, 2);
	let other = entity("Other", EntityType::Retail, 3);

	small.employee_count = Some(5);
	large.employee_count = Some(900);

	let (service, _) = live_service(vec![small, large, other]);
	let request = ListRequest {
		filters: DirectoryFilters { entity_type: Some(EntityType::Software), ..Default::default() },
		sort: Some(SortRequest {
			field: "employeeCount".to_string(),
			direction: Some("asc".to_string()),
		}),
		include_total: true,
		..Default::default()
	};
	let response = service
		.list_for_role(Some(&caller("u1", Role::Visitor)), request)
		.await
		.expect("List should succeed.");

	assert_eq!(names(&response.entities), vec!["Small", "Large"]);
	assert_eq!(response.total_count, Some(2));
}

#[tokio::test]
async fn get_by_id_distinguishes_denied_from_missing() {
	// Acme starts public, then is flagged confidential.
	let acme =
		with_visibility(entity("Acme Robotics", EntityType::Robotics, 0), Visibility::Public, true);
	let id = acme.id;
	let (service, _) = live_service(vec![acme]);
	let visitor = caller("u1", Role::Visitor);

	assert!(matches!(
		service.get_by_id(Some(&visitor), id).await,
		Err(Error::AccessDenied { .. })
	));
	assert!(matches!(service.get_by_id(None, id).await, Err(Error::AccessDenied { .. })));
	assert!(matches!(
		service.get_by_id(Some(&visitor), Uuid::new_v4()).await,
		Err(Error::NotFound { .. })
	));

	let found = service
		.get_by_id(Some(&caller("u2", Role::Confidential)), id)
		.await
		.expect("Cleared callers should see confidential entities.");

	assert_eq!(found.id, id);
}

#[tokio::test]
async fn anonymous_lookup_degrades_to_public_only() {
	let public = entity("Open Co", EntityType::Retail, 0);
	let member_only =
		with_visibility(entity("Club Co", EntityType::Retail, 1), Visibility::Member, false);
	let (public_id, member_id) = (public.id, member_only.id);
	let (service, _) = live_service(vec![public, member_only]);

	assert!(service.get_by_id(None, public_id).await.is_ok());
	assert!(matches!(service.get_by_id(None, member_id).await, Err(Error::AccessDenied { .. })));
}

#[tokio::test]
async fn get_by_ids_truncates_to_the_batch_cap() {
	let catalog = (0..150)
		.map(|i| entity(&format!("Org {i}"), EntityType::Software, i))
		.collect::<Vec<_>>();
	let ids = catalog.iter().map(|entity| entity.id).collect::<Vec<_>>();
	let (service, _) = live_service(catalog);
	let entities = service
		.get_by_ids(Some(&caller("u1", Role::Member)), &ids)
		.await
		.expect("Oversized batches are truncated, not rejected.");

	assert_eq!(entities.len(), 100);
	assert_eq!(entities.iter().map(|entity| entity.id).collect::<Vec<_>>(), ids[..100].to_vec());
}

#[tokio::test]
async fn get_by_ids_keeps_request_order_and_filters_hidden() {
	let catalog = tiered_catalog();
	let ids =
		catalog.iter().rev().map(|entity| entity.id).chain([Uuid::new_v4()]).collect::<Vec<_>>();
	let (service, _) = live_service(catalog);
	let entities = service
		.get_by_ids(Some(&caller("u1", Role::Subscriber)), &ids)
		.await
		.expect("Batch fetch should succeed.");

	assert_eq!(names(&entities), vec!["Sub Co", "Public Co"]);
}

#[tokio::test]
async fn get_owned_by_is_limited_to_owner_and_admin() {
	let mut mine = entity("Mine", EntityType::Legal, 0);
	let theirs = entity("Theirs", EntityType::Legal, 1);

	mine.added_by = "owner-9".to_string();

	let (service, _) = live_service(vec![mine, theirs]);
	let owned = service
		.get_owned_by(Some(&caller("owner-9", Role::Visitor)), "owner-9")
		.await
		.expect("Owners may list their own entities.");

	assert_eq!(names(&owned), vec!["Mine"]);
	assert!(
		service
			.get_owned_by(Some(&caller("admin", Role::Admin)), "owner-9")
			.await
			.is_ok()
	);
	assert!(matches!(
		service.get_owned_by(Some(&caller("someone", Role::Confidential)), "owner-9").await,
		Err(Error::AccessDenied { .. })
	));
}

#[tokio::test]
async fn get_owned_by_hides_tiers_the_owner_cannot_see() {
	let owner = caller("owner-9", Role::Member);
	let mut open = entity("Open Co", EntityType::Legal, 0);
	let mut members =
		with_visibility(entity("Club Co", EntityType::Legal, 1), Visibility::Member, false);
	let mut secret =
		with_visibility(entity("Secret Co", EntityType::Legal, 2), Visibility::Member, true);

	for owned in [&mut open, &mut members, &mut secret] {
		owned.added_by = "owner-9".to_string();
	}

	let secret_id = secret.id;
	let (service, _) = live_service(vec![open, members, secret]);
	let owned = service
		.get_owned_by(Some(&owner), "owner-9")
		.await
		.expect("Owners may list their own entities.");

	assert_eq!(names(&owned), vec!["Open Co", "Club Co"]);
	assert!(matches!(
		service.get_by_id(Some(&owner), secret_id).await,
		Err(Error::AccessDenied { .. })
	));

	let visitor_view = service
		.get_owned_by(Some(&caller("owner-9", Role::Visitor)), "owner-9")
		.await
		.expect("Owners may list their own entities.");

	assert_eq!(names(&visitor_view), vec!["Open Co"]);

	let admin_view = service
		.get_owned_by(Some(&caller("root", Role::Admin)), "owner-9")
		.await
		.expect("Admins may list any owner's entities.");

	assert_eq!(names(&admin_view), vec!["Open Co", "Club Co", "Secret Co"]);
}

#[tokio::test]
async fn persistence_failures_surface_as_query_errors_with_context() {
	let store = Arc::new(FlakyStore::with_entities(tiered_catalog()));
	let service = DirectoryService::new(config(CachePhase::Live, false), store.clone());

	store.fail_queries.store(true, Ordering::SeqCst);

	let err = service
		.list_for_role(Some(&caller("u1", Role::Member)), ListRequest::default())
		.await
		.expect_err("Injected failures should surface.");

	let Error::Query { operation, role, .. } = err else {
		panic!("Expected a query error, got {err:?}.");
	};

	assert_eq!(operation, "list_for_role");
	assert_eq!(role, Role::Member);
}
