use time::{OffsetDateTime, macros::datetime};
use uuid::Uuid;

use orgdex_domain::{Entity, EntityType, Visibility};

struct Seed {
	id: u128,
	name: &'static str,
	entity_type: EntityType,
	short_description: &'static str,
	location: &'static str,
	founded_year: i32,
	employee_count: i32,
	tags: &'static [&'static str],
	services: &'static [&'static str],
	certifications: &'static [&'static str],
	added: OffsetDateTime,
}

const SEEDS: &[Seed] = &[
	Seed {
		id: 0x6f72_6764_6578_0000_0000_0000_0000_0001,
		name: "Northwind Robotics",
		entity_type: EntityType::Robotics,
		short_description: "Warehouse automation robots and fleet software.",
		location: "Pittsburgh, PA",
		founded_year: 2014,
		employee_count: 180,
		tags: &["automation", "warehouse"],
		services: &["robot integration", "fleet management"],
		certifications: &["ISO 9001"],
		added: datetime!(2024-01-08 09:00 UTC),
	},
	Seed {
		id: 0x6f72_6764_6578_0000_0000_0000_0000_0002,
		name: "Bluefin Analytics",
		entity_type: EntityType::ArtificialIntelligence,
		short_description: "Forecasting models for retail and logistics teams.",
		location: "Boston, MA",
		founded_year: 2019,
		employee_count: 45,
		tags: &["machine learning", "forecasting"],
		services: &["demand forecasting", "data science consulting"],
		certifications: &[],
		added: datetime!(2024-02-12 14:30 UTC),
	},
	Seed {
		id: 0x6f72_6764_6578_0000_0000_0000_0000_0003,
		name: "Granite Ridge Builders",
		entity_type: EntityType::Construction,
		short_description: "Commercial construction and site management.",
		location: "Denver, CO",
		founded_year: 1998,
		employee_count: 320,
		tags: &["commercial", "infrastructure"],
		services: &["general contracting", "design build"],
		certifications: &["OSHA VPP"],
		added: datetime!(2024-03-03 11:15 UTC),
	},
	Seed {
		id: 0x6f72_6764_6578_0000_0000_0000_0000_0004,
		name: "Harbor Freight Logistics",
		entity_type: EntityType::Logistics,
		short_description: "Regional freight forwarding and cold storage.",
		location: "Seattle, WA",
		founded_year: 2006,
		employee_count: 95,
		tags: &["freight", "cold chain"],
		services: &["freight forwarding", "warehousing"],
		certifications: &[],
		added: datetime!(2024-04-21 08:45 UTC),
	},
	Seed {
		id: 0x6f72_6764_6578_0000_0000_0000_0000_0005,
		name: "Lumen Health Partners",
		entity_type: EntityType::Healthcare,
		short_description: "Outpatient clinics and telehealth services.",
		location: "Austin, TX",
		founded_year: 2011,
		employee_count: 410,
		tags: &["clinics", "telehealth"],
		services: &["primary care", "telehealth"],
		certifications: &["HIPAA"],
		added: datetime!(2024-05-30 16:00 UTC),
	},
	Seed {
		id: 0x6f72_6764_6578_0000_0000_0000_0000_0006,
		name: "Sentinel Cyber Labs",
		entity_type: EntityType::Cybersecurity,
		short_description: "Penetration testing and managed detection.",
		location: "Arlington, VA",
		founded_year: 2016,
		employee_count: 60,
		tags: &["security", "compliance"],
		services: &["penetration testing", "incident response"],
		certifications: &["SOC 2"],
		added: datetime!(2024-06-17 10:20 UTC),
	},
];

/// Fixed public demo catalog served when synthetic data is enabled.
pub fn entities() -> Vec<Entity> {
	SEEDS.iter().map(to_entity).collect()
}

fn to_entity(seed: &Seed) -> Entity {
	let strings = |items: &[&str]| items.iter().map(|item| item.to_string()).collect::<Vec<_>>();

	Entity {
		id: Uuid::from_u128(seed.id),
		added_by: "synthetic".to_string(),
		visibility: Some(Visibility::Public),
		is_confidential: false,
		name: seed.name.to_string(),
		entity_type: seed.entity_type,
		short_description: seed.short_description.to_string(),
		full_description: None,
		location: Some(seed.location.to_string()),
		founded_year: Some(seed.founded_year),
		employee_count: Some(seed.employee_count),
		tags: strings(seed.tags),
		services: strings(seed.services),
		industries: vec![seed.entity_type.label().to_string()],
		certifications: strings(seed.certifications),
		partnerships: Vec::new(),
		store: None,
		date_added: seed.added,
		last_updated: seed.added,
	}
}
