use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// Stable member identifier as handed over by the surrounding application.
pub type MemberId = String;

/// Graph-space or screen-space coordinate pair.
pub type Point = (f64, f64);

/// A person in the collaboration graph. Consumed read-only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Member {
	/// Unique member id.
	pub id: MemberId,
	/// Display name, matched by the name filter.
	pub label: String,
	/// Job title. Metadata only.
	#[serde(default)]
	pub role: String,
	/// Department, matched exactly by the department filter.
	#[serde(default)]
	pub department: String,
	/// Optional layout hint, used only when the member is first placed.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub x: Option<f64>,
	/// Optional layout hint, paired with `x`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub y: Option<f64>,
}

/// Who recorded a relationship.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
	/// Recorded by the source about the target.
	#[default]
	Outgoing,
	/// Recorded on behalf of the target.
	Incoming,
}

/// `source`'s evaluation of its collaboration with `target`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
	/// Evaluating member.
	pub source: MemberId,
	/// Evaluated member.
	pub target: MemberId,
	/// Score on the 0 to 4 scale.
	pub score: i64,
	/// Carried through; arrows always point from source to target.
	#[serde(default)]
	pub direction: Direction,
	/// RFC 3339 creation time, used to pick the most recent evaluation.
	#[serde(default)]
	pub timestamp: String,
}

impl Relationship {
	/// Orders relationships by timestamp. RFC 3339 values compare as instants;
	/// anything unparseable sorts before them and lexically among itself.
	pub fn recency_key(&self) -> (i64, &str) {
		let instant = DateTime::parse_from_rfc3339(&self.timestamp)
			.map(|t| t.timestamp_millis())
			.unwrap_or(i64::MIN);
		(instant, self.timestamp.as_str())
	}
}

/// One snapshot of the externally owned dataset.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamData {
	/// Every member of the team.
	pub nodes: Vec<Member>,
	/// Every recorded evaluation.
	pub edges: Vec<Relationship>,
}

impl TeamData {
	/// Parses a snapshot handed over as JSON.
	pub fn from_json(raw: &str) -> serde_json::Result<Self> {
		serde_json::from_str(raw)
	}

	/// Looks a member up by id.
	pub fn member(&self, id: &str) -> Option<&Member> {
		self.nodes.iter().find(|m| m.id == id)
	}
}
