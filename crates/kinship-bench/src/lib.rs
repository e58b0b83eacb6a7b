use kinship_core::{Person, Relationship, Snapshot};
use kinship_draft::DraftOp;

/// Builds a married-couple tree: every couple has `fanout` children and each
/// child marries someone from outside the tree, down to `generations` levels.
pub fn generate_family(generations: usize, fanout: usize) -> Snapshot {
    let mut people = Vec::new();
    let mut relationships = Vec::new();
    let mut next_rel = 0usize;
    let mut rel_id = || {
        next_rel += 1;
        format!("r{next_rel}")
    };

    people.push(Person::new("p0", "Root Ancestor"));
    people.push(Person::new("s0", "Root Spouse"));
    relationships.push(Relationship::earliest_ancestor(rel_id(), "p0"));
    relationships.push(Relationship::spouse_of(rel_id(), "p0", "s0"));

    let mut couples = vec![(String::from("p0"), String::from("s0"))];
    let mut counter = 1usize;
    for generation in 1..generations {
        let mut next = Vec::with_capacity(couples.len() * fanout);
        for (parent, spouse) in &couples {
            for _ in 0..fanout {
                let child = format!("p{counter}");
                let partner = format!("s{counter}");
                counter += 1;

                people.push(Person::new(child.as_str(), format!("Child {child} Gen{generation}")));
                people.push(Person::new(partner.as_str(), format!("Spouse {partner}")));
                relationships.push(Relationship::child_of(rel_id(), child.as_str(), parent.as_str()));
                relationships.push(Relationship::child_of(rel_id(), child.as_str(), spouse.as_str()));
                relationships.push(Relationship::spouse_of(rel_id(), child.as_str(), partner.as_str()));
                next.push((child, partner));
            }
        }
        couples = next;
    }

    Snapshot::new(people, relationships).with_tree("bench", 1)
}

/// Single line of descent, the worst case for traversal depth.
pub fn generate_chain(len: usize) -> Snapshot {
    let people = (0..len)
        .map(|i| Person::new(format!("c{i}"), format!("Link {i}")))
        .collect();
    let relationships = (1..len)
        .map(|i| Relationship::child_of(format!("r{i}"), format!("c{i}"), format!("c{}", i - 1)))
        .collect();
    Snapshot::new(people, relationships)
}

/// Draft list that adds one new child under every `stride`-th person of the
/// snapshot and deletes every `stride`-th relationship.
pub fn generate_drafts(snapshot: &Snapshot, stride: usize) -> Vec<DraftOp> {
    let stride = stride.max(1);
    let mut drafts = Vec::new();
    for (i, person) in snapshot.people.iter().enumerate().step_by(stride) {
        let child = format!("draft{i}");
        drafts.push(DraftOp::CreatePerson {
            person: Person::new(child.as_str(), format!("Draft {i}")),
        });
        drafts.push(DraftOp::CreateRelationship {
            relationship: Relationship::child_of(format!("dr{i}"), child.as_str(), person.id.clone()),
        });
    }
    for rel in snapshot.relationships.iter().skip(1).step_by(stride) {
        drafts.push(DraftOp::DeleteRelationship {
            relationship_id: rel.id.clone(),
        });
    }
    drafts
}
