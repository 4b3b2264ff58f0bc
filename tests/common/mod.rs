use paraquery::normalize::SamePos;
use paraquery::relation::Relation;
use paraquery::store::{Rule, Store};

/// A handful of rules around "barrier" and "man".
pub fn seed(store: &mut Store) {
    let rules = [
        Rule::new("barrier", "wall", 0.5)
            .with_pivots(&[("wall", "0.4"), ("mur", "0.3")])
            .with_relation(Relation::Hypernym, 1)
            .with_same_pos(SamePos::Same),
        Rule::new("barrier", "barrier", 0.6)
            .with_relation(Relation::Synonym, 0)
            .with_same_pos(SamePos::Same),
        Rule::new("barrier", "obstacle", 0.2)
            .with_pivots(&[("hindernis", "0.2")])
            .with_relation(Relation::Synonym, 0)
            .with_same_pos(SamePos::Same),
        Rule::new("barrier", "road block", 0.05).with_pivots(&[("sperre", "0.1")]),
        Rule::new("man", "guy", 0.3)
            .with_pivots(&[("homme", "0.5")])
            .with_relation(Relation::Synonym, 0)
            .with_same_pos(SamePos::Same),
        Rule::new("man", "men", 0.1)
            .with_relation(Relation::Undefined, 2)
            .with_same_pos(SamePos::Different)
            .with_duplicate_target(true),
        Rule::new("wall", "barrier", 0.25)
            .with_pivots(&[("fence", "0.2")])
            .with_relation(Relation::Hyponym, 1)
            .with_same_pos(SamePos::Same),
    ];
    for rule in &rules {
        store.insert(rule).expect("insert rule");
    }
}
