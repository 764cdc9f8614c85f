mod support;

use std::sync::{Arc, atomic::Ordering};

use serde_json::json;
use uuid::Uuid;

use orgdex_config::CachePhase;
use orgdex_domain::{EntityType, Role, Visibility};
use orgdex_service::{CreateEntityRequest, DirectoryService, EntityPatch, Error};
use orgdex_storage::EntityStore;

use support::{FlakyStore, caller, config, entity, live_service, with_visibility};

fn valid_request() -> CreateEntityRequest {
	CreateEntityRequest {
		name: Some("  Initech  ".to_string()),
		entity_type: Some("software".to_string()),
		short_description: Some("Enterprise software".to_string()),
		tags: Some(json!(["erp", "b2b"])),
		..Default::default()
	}
}

#[tokio::test]
async fn subscribers_cannot_create() {
	let (service, store) = live_service(Vec::new());
	let result = service.create(Some(&caller("u1", Role::Subscriber)), valid_request()).await;

	assert!(matches!(result, Err(Error::Permission { .. })));
	assert!(store.is_empty().await);
	assert_eq!(service.cache.invalidation_count(), 0);
}

#[tokio::test]
async fn create_stamps_ownership_and_defaults() {
	let (service, store) = live_service(Vec::new());
	let created = service
		.create(Some(&caller("member-1", Role::Member)), valid_request())
		.await
		.expect("Members may create.");

	assert_eq!(created.name, "Initech");
	assert_eq!(created.entity_type, EntityType::Software);
	assert_eq!(created.added_by, "member-1");
	assert_eq!(created.visibility, Some(Visibility::Public));
	assert!(!created.is_confidential);
	assert_eq!(created.tags, vec!["erp".to_string(), "b2b".to_string()]);
	assert!(created.services.is_empty());
	assert_eq!(created.date_added, created.last_updated);
	assert_eq!(store.get(created.id).await.expect("Store read."), Some(created));
	assert_eq!(service.cache.invalidation_count(), 1);
}

#[tokio::test]
async fn create_reports_every_invalid_field() {
	let (service, store) = live_service(Vec::new());
	let request = CreateEntityRequest {
		name: Some("   ".to_string()),
		entity_type: Some("spaceship".to_string()),
		employee_count: Some(-4),
		certifications: Some(json!("ISO 9001")),
		..Default::default()
	};
	let err = service
		.create(Some(&caller("u1", Role::Admin)), request)
		.await
		.expect_err("Invalid payloads are rejected.");

	let Error::Validation { mut fields, .. } = err else {
		panic!("Expected a validation error, got {err:?}.");
	};

	fields.sort();

	assert_eq!(
		fields,
		["certifications", "employee_count", "name", "short_description", "type"]
			.map(str::to_string)
			.to_vec()
	);
	assert!(store.is_empty().await);
	assert_eq!(service.cache.invalidation_count(), 0);
}

#[tokio::test]
async fn confidential_creation_requires_clearance() {
	let (service, store) = live_service(Vec::new());
	let request = CreateEntityRequest { is_confidential: Some(true), ..valid_request() };
	let denied = service.create(Some(&caller("u1", Role::Member)), request.clone()).await;

	assert!(matches!(denied, Err(Error::Permission { .. })));
	assert!(store.is_empty().await);

	let created = service
		.create(Some(&caller("u2", Role::Confidential)), request)
		.await
		.expect("Cleared callers may create confidential entities.");

	assert_eq!(created.effective_visibility(), Visibility::Confidential);
}

#[tokio::test]
async fn non_owners_cannot_update_and_nothing_is_invalidated() {
	let target = entity("Acme", EntityType::Retail, 0);
	let id = target.id;
	let (service, store) = live_service(vec![target.clone()]);
	let patch = EntityPatch { name: Some("Hijacked".to_string()), ..Default::default() };
	let result = service.update(Some(&caller("intruder", Role::Member)), id, patch).await;

	assert!(matches!(result, Err(Error::Permission { .. })));
	assert_eq!(store.get(id).await.expect("Store read."), Some(target));
	assert_eq!(service.cache.invalidation_count(), 0);
}

#[tokio::test]
async fn update_merges_only_supplied_fields() {
	let mut target = entity("Acme", EntityType::Retail, 60);

	target.services = vec!["delivery".to_string()];

	let id = target.id;
	let (service, store) = live_service(vec![target.clone()]);
	let patch = EntityPatch {
		short_description: Some("Regional grocer".to_string()),
		employee_count: Some(400),
		tags: Some(json!(["grocery"])),
		visibility: Some("member".to_string()),
		..Default::default()
	};
	let updated = service
		.update(Some(&caller("owner-1", Role::Member)), id, patch)
		.await
		.expect("Owners may update.");

	assert_eq!(updated.name, "Acme");
	assert_eq!(updated.services, vec!["delivery".to_string()]);
	assert_eq!(updated.short_description, "Regional grocer");
	assert_eq!(updated.employee_count, Some(400));
	assert_eq!(updated.tags, vec!["grocery".to_string()]);
	assert_eq!(updated.visibility, Some(Visibility::Member));
	assert_eq!(updated.date_added, target.date_added);
	assert!(updated.last_updated > target.last_updated);
	assert_eq!(store.get(id).await.expect("Store read."), Some(updated));
	assert_eq!(service.cache.invalidation_count(), 1);
}

#[tokio::test]
async fn update_of_missing_entity_is_not_found() {
	let (service, _) = live_service(Vec::new());
	let result = service
		.update(Some(&caller("u1", Role::Admin)), Uuid::new_v4(), EntityPatch::default())
		.await;

	assert!(matches!(result, Err(Error::NotFound { .. })));
}

#[tokio::test]
async fn promotion_to_confidential_requires_clearance() {
	let target = entity("Acme", EntityType::Defense, 0);
	let id = target.id;
	let (service, store) = live_service(vec![target]);
	let patch = EntityPatch { is_confidential: Some(true), ..Default::default() };
	let owner = caller("owner-1", Role::Member);

	assert!(matches!(
		service.update(Some(&owner), id, patch.clone()).await,
		Err(Error::Permission { .. })
	));

	let promoted = service
		.update(Some(&caller("root", Role::Admin)), id, patch)
		.await
		.expect("Admins may promote.");

	assert!(promoted.is_confidential);
	assert!(store.get(id).await.expect("Store read.").is_some_and(|entity| entity.is_confidential));
}

#[tokio::test]
async fn owners_without_clearance_cannot_declassify() {
	let target = with_visibility(entity("Vault", EntityType::Defense, 0), Visibility::Member, true);
	let id = target.id;
	let (service, store) = live_service(vec![target.clone()]);
	let owner = caller("owner-1", Role::Member);
	let demotions = [
		EntityPatch { is_confidential: Some(false), ..Default::default() },
		EntityPatch { visibility: Some("public".to_string()), ..Default::default() },
		EntityPatch { name: Some("Renamed".to_string()), ..Default::default() },
	];

	for patch in demotions {
		assert!(matches!(
			service.update(Some(&owner), id, patch).await,
			Err(Error::Permission { .. })
		));
	}

	assert_eq!(store.get(id).await.expect("Store read."), Some(target));
	assert!(matches!(service.get_by_id(None, id).await, Err(Error::AccessDenied { .. })));
	assert!(matches!(service.delete(Some(&owner), id).await, Err(Error::Permission { .. })));
	assert_eq!(store.len().await, 1);
	assert_eq!(service.cache.invalidation_count(), 0);

	let declassified = service
		.update(
			Some(&caller("root", Role::Admin)),
			id,
			EntityPatch { is_confidential: Some(false), ..Default::default() },
		)
		.await
		.expect("Admins may declassify.");

	assert!(!declassified.is_confidential);
}

#[tokio::test]
async fn owners_without_clearance_cannot_delete_confidential_entities() {
	let target = with_visibility(entity("Vault", EntityType::Defense, 0), Visibility::Member, true);
	let id = target.id;
	let (service, store) = live_service(vec![target]);
	let result = service.delete(Some(&caller("owner-1", Role::Member)), id).await;

	assert!(matches!(result, Err(Error::Permission { .. })));
	assert_eq!(store.len().await, 1);

	let response = service
		.delete(Some(&caller("root", Role::Admin)), id)
		.await
		.expect("Admins may delete confidential entities.");

	assert_eq!(response.id, id);
	assert!(store.is_empty().await);
}

#[tokio::test]
async fn delete_removes_presence_records() {
	let target = entity("Acme", EntityType::Retail, 0);
	let id = target.id;
	let (service, store) = live_service(vec![target]);
	let seen_at = time::OffsetDateTime::now_utc();

	store.record_presence(id, "u1", seen_at).await;
	store.record_presence(id, "u2", seen_at).await;

	let response = service
		.delete(Some(&caller("owner-1", Role::Member)), id)
		.await
		.expect("Owners may delete.");

	assert_eq!(response.presence_removed, Some(2));
	assert_eq!(store.presence_count(id).await, 0);
	assert!(matches!(
		service.delete(Some(&caller("owner-1", Role::Member)), id).await,
		Err(Error::NotFound { .. })
	));
}

#[tokio::test]
async fn presence_cleanup_failure_does_not_undo_the_delete() {
	let target = entity("Acme", EntityType::Retail, 0);
	let id = target.id;
	let store = Arc::new(FlakyStore::with_entities(vec![target]));
	let service = DirectoryService::new(config(CachePhase::Live, false), store.clone());

	store.fail_presence.store(true, Ordering::SeqCst);

	let response = service
		.delete(Some(&caller("owner-1", Role::Member)), id)
		.await
		.expect("Delete stands even when presence cleanup fails.");

	assert_eq!(response.presence_removed, None);
	assert!(store.inner.is_empty().await);
	assert_eq!(service.cache.invalidation_count(), 1);
}

#[tokio::test]
async fn failed_writes_still_invalidate_the_cache() {
	let target = entity("Acme", EntityType::Retail, 0);
	let id = target.id;
	let store = Arc::new(FlakyStore::with_entities(vec![target.clone()]));
	let service = DirectoryService::new(config(CachePhase::Live, false), store.clone());
	let owner = caller("owner-1", Role::Member);
	let patch = EntityPatch { name: Some("Acme Two".to_string()), ..Default::default() };

	store.fail_writes.store(true, Ordering::SeqCst);

	assert!(matches!(
		service.create(Some(&owner), valid_request()).await,
		Err(Error::Query { operation: "create", .. })
	));
	assert!(matches!(
		service.update(Some(&owner), id, patch).await,
		Err(Error::Query { operation: "update", .. })
	));
	assert!(matches!(
		service.delete(Some(&owner), id).await,
		Err(Error::Query { operation: "delete", .. })
	));
	assert_eq!(service.cache.invalidation_count(), 3);
	assert_eq!(store.inner.get(id).await.expect("Store read."), Some(target));
}
