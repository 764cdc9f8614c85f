use std::{
	fmt::{Display, Formatter},
	str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::ParseError;

/// Closed set of industry categories an entity is filed under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
	Aerospace,
	Agriculture,
	ArtificialIntelligence,
	Automotive,
	Biotechnology,
	Construction,
	Consulting,
	Cybersecurity,
	Defense,
	Education,
	Energy,
	Finance,
	Government,
	Healthcare,
	Hospitality,
	Legal,
	Logistics,
	Manufacturing,
	Media,
	Nonprofit,
	RealEstate,
	Retail,
	Robotics,
	Software,
	Telecommunications,
}
impl EntityType {
	pub const ALL: [Self; 25] = [
		Self::Aerospace,
		Self::Agriculture,
		Self::ArtificialIntelligence,
		Self::Automotive,
		Self::Biotechnology,
		Self::Construction,
		Self::Consulting,
		Self::Cybersecurity,
		Self::Defense,
		Self::Education,
		Self::Energy,
		Self::Finance,
		Self::Government,
		Self::Healthcare,
		Self::Hospitality,
		Self::Legal,
		Self::Logistics,
		Self::Manufacturing,
		Self::Media,
		Self::Nonprofit,
		Self::RealEstate,
		Self::Retail,
		Self::Robotics,
		Self::Software,
		Self::Telecommunications,
	];

	/// Stored enum value.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Aerospace => "aerospace",
			Self::Agriculture => "agriculture",
			Self::ArtificialIntelligence => "artificial_intelligence",
			Self::Automotive => "automotive",
			Self::Biotechnology => "biotechnology",
			Self::Construction => "construction",
			Self::Consulting => "consulting",
			Self::Cybersecurity => "cybersecurity",
			Self::Defense => "defense",
			Self::Education => "education",
			Self::Energy => "energy",
			Self::Finance => "finance",
			Self::Government => "government",
			Self::Healthcare => "healthcare",
			Self::Hospitality => "hospitality",
			Self::Legal => "legal",
			Self::Logistics => "logistics",
			Self::Manufacturing => "manufacturing",
			Self::Media => "media",
			Self::Nonprofit => "nonprofit",
			Self::RealEstate => "real_estate",
			Self::Retail => "retail",
			Self::Robotics => "robotics",
			Self::Software => "software",
			Self::Telecommunications => "telecommunications",
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			Self::Aerospace => "Aerospace",
			Self::Agriculture => "Agriculture",
			Self::ArtificialIntelligence => "Artificial Intelligence",
			Self::Automotive => "Automotive",
			Self::Biotechnology => "Biotechnology",
			Self::Construction => "Construction",
			Self::Consulting => "Consulting",
			Self::Cybersecurity => "Cybersecurity",
			Self::Defense => "Defense",
			Self::Education => "Education",
			Self::Energy => "Energy",
			Self::Finance => "Finance",
			Self::Government => "Government",
			Self::Healthcare => "Healthcare",
			Self::Hospitality => "Hospitality",
			Self::Legal => "Legal Services",
			Self::Logistics => "Logistics",
			Self::Manufacturing => "Manufacturing",
			Self::Media => "Media & Entertainment",
			Self::Nonprofit => "Nonprofit",
			Self::RealEstate => "Real Estate",
			Self::Retail => "Retail",
			Self::Robotics => "Robotics",
			Self::Software => "Software",
			Self::Telecommunications => "Telecommunications",
		}
	}

	pub fn description(self) -> &'static str {
		match self {
			Self::Aerospace => "Aircraft, spacecraft, satellites and launch systems",
			Self::Agriculture => "Farming, agritech, food production and crop science",
			Self::ArtificialIntelligence =>
				"Machine learning, AI models, data science and intelligent automation",
			Self::Automotive => "Vehicles, mobility, EV and automotive components",
			Self::Biotechnology => "Life sciences, genomics, pharmaceuticals and lab research",
			Self::Construction => "Building, civil engineering, infrastructure and architecture",
			Self::Consulting => "Advisory, strategy, management and professional services",
			Self::Cybersecurity =>
				"Security software, threat detection, penetration testing and compliance",
			Self::Defense => "Defense systems, military contracting and national security",
			Self::Education => "Schools, training, e-learning and academic institutions",
			Self::Energy => "Power generation, renewables, oil, gas and utilities",
			Self::Finance => "Banking, investment, insurance and fintech",
			Self::Government => "Public sector agencies and government services",
			Self::Healthcare => "Hospitals, clinics, medical devices and health services",
			Self::Hospitality => "Hotels, restaurants, travel and tourism",
			Self::Legal => "Law firms, legal technology and compliance counsel",
			Self::Logistics => "Shipping, freight, warehousing and supply chain",
			Self::Manufacturing => "Industrial production, fabrication and factory automation",
			Self::Media => "Publishing, broadcasting, film, music and digital content",
			Self::Nonprofit => "Charities, foundations and community organizations",
			Self::RealEstate => "Property development, brokerage and facilities management",
			Self::Retail => "Stores, e-commerce, consumer goods and distribution",
			Self::Robotics => "Robots, industrial automation, drones and autonomous systems",
			Self::Software => "Software development, SaaS, cloud platforms and IT services",
			Self::Telecommunications => "Networks, wireless, broadband and communications",
		}
	}
}
impl Display for EntityType {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for EntityType {
	type Err = ParseError;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		let normalized = raw.trim().to_ascii_lowercase().replace(['-', ' '], "_");

		Self::ALL
			.into_iter()
			.find(|kind| kind.as_str() == normalized)
			.ok_or_else(|| ParseError::UnknownEntityType(raw.trim().to_string()))
	}
}
