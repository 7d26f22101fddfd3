use std::collections::HashSet;

use super::types::{Member, Relationship};

/// Name and department filters as typed by the user. Empty fields match
/// everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterQuery {
	/// Case-insensitive substring of a member's label.
	pub name: String,
	/// Exact department name.
	pub department: String,
}

impl FilterQuery {
	/// Builds a query from both fields.
	pub fn new(name: impl Into<String>, department: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			department: department.into(),
		}
	}

	/// Surrounding whitespace is not part of a query.
	pub fn normalized(&self) -> Self {
		Self::new(self.name.trim(), self.department.trim())
	}

	/// Whether the query keeps the whole dataset.
	pub fn is_empty(&self) -> bool {
		let query = self.normalized();
		query.name.is_empty() && query.department.is_empty()
	}
}

/// Induced subgraph for `query`.
///
/// A name query keeps the matched members plus their direct neighbours, but
/// only the relationships touching a matched member. A department query then
/// narrows the nodes and keeps relationships with both ends inside.
pub fn filter(
	members: &[Member],
	relationships: &[Relationship],
	query: &FilterQuery,
) -> (Vec<Member>, Vec<Relationship>) {
	let query = query.normalized();
	let name = query.name.to_lowercase();
	let department = query.department.as_str();

	if name.is_empty() && department.is_empty() {
		return (members.to_vec(), relationships.to_vec());
	}

	let (mut nodes, mut edges) = if name.is_empty() {
		(members.to_vec(), relationships.to_vec())
	} else {
		let matched: HashSet<&str> = members
			.iter()
			.filter(|m| m.label.to_lowercase().contains(&name))
			.map(|m| m.id.as_str())
			.collect();

		let mut neighborhood = matched.clone();
		for r in relationships {
			if matched.contains(r.source.as_str()) {
				neighborhood.insert(r.target.as_str());
			}
			if matched.contains(r.target.as_str()) {
				neighborhood.insert(r.source.as_str());
			}
		}

		let nodes = members
			.iter()
			.filter(|m| neighborhood.contains(m.id.as_str()))
			.cloned()
			.collect();
		let edges = relationships
			.iter()
			.filter(|r| matched.contains(r.source.as_str()) || matched.contains(r.target.as_str()))
			.cloned()
			.collect();
		(nodes, edges)
	};

	if !department.is_empty() {
		nodes.retain(|m| m.department == department);
		let kept: HashSet<&str> = nodes.iter().map(|m| m.id.as_str()).collect();
		edges.retain(|r| kept.contains(r.source.as_str()) && kept.contains(r.target.as_str()));
	}

	(nodes, edges)
}

/// Distinct non-empty departments in first-seen order, for the department picker.
pub fn departments(members: &[Member]) -> Vec<String> {
	let mut seen = HashSet::new();
	members
		.iter()
		.filter(|m| !m.department.is_empty() && seen.insert(m.department.as_str()))
		.map(|m| m.department.clone())
		.collect()
}
