/*!
This library decides defeasible entailment for propositional knowledge bases in the style of Kraus, Lehmann and Magidor (KLM).

# Defeasible knowledge bases
A knowledge base consists of classical statements such as `b=>p` ("penguins are birds") and defeasible implications such as `b~>f` ("birds typically fly").
Defeasible implications are not refuted by exceptions: a knowledge base may state that birds typically fly and that penguins typically do not, without being inconsistent.
To decide whether a query `α~>β` follows, the statements of the knowledge base are ordered by how exceptional their antecedent is (the BaseRank ranking) and the least typical information is given up until the antecedent `α` is consistent with what remains.
Each closure operation differs in how much it gives up:

- rational closure removes entire ranks,
- lexicographic closure keeps as many statements of a rank as possible,
- basic and minimal relevant closure only remove statements which are relevant to the conflict with `α`.

An entailed query may be explained by its justifications, the minimal subsets of the remaining knowledge base which entail it.

## Noteworthy relations between the closures
- Every closure operation uses the same ranking, which is computed once per knowledge base
- Everything rational closure entails is entailed by lexicographic closure
- Minimal relevant closure never considers more statements relevant than basic relevant closure
- A classical statement is never given up

# Classical entailment
All closure operations reduce to classical entailment checks between materialised formulas, where `α~>β` is read as `α=>β`.
Two interchangeable oracles are offered: the default one is based on the binary decision diagrams of `biodivine-lib-bdd` (<https://github.com/sybila/biodivine-lib-bdd>), the other one enumerates truth tables and is only suitable for small signatures.

# Input format
Every statement is one formula in the following syntax, with the operators listed by increasing binding strength:
- `a~>b`: defeasible implication, only allowed once and at the top level
- `a<=>b`: equivalence
- `a=>b`: classical implication
- `a||b`: disjunction
- `a&&b`: conjunction
- `!a`: negation

Atoms are non-empty words of letters, digits and `_`; parentheses group subformulas.
*/

/*!
## Example input file:
```text
# birds and penguins
b=>p
p~>f
p~>w
b~>!f
```
*/

/*!
## Usage examples
First parse the knowledge base and compute its ranking.
```rust
use klm_closure::datatypes::KnowledgeBase;
use klm_closure::reasoner::{Reasoner, ReasonerConfig};
// use the above example as input
let kb = KnowledgeBase::parse(["b=>p", "p~>f", "p~>w", "b~>!f"]).expect("the statements are well formed");
let reasoner = Reasoner::new(kb, ReasonerConfig::default());
let base_rank = reasoner.base_rank().expect("the classical statements are consistent");
// `b~>!f` is exceptional, as penguins are birds which typically fly
assert_eq!(base_rank.ranking.finite_ranks().len(), 2);
print!("{}", base_rank.ranking);
```
### decide a query with a single closure operation
```rust
# use klm_closure::datatypes::KnowledgeBase;
# use klm_closure::reasoner::{Reasoner, ReasonerConfig};
use klm_closure::closure::Algorithm;
# let kb = KnowledgeBase::parse(["b=>p", "p~>f", "p~>w", "b~>!f"]).expect("the statements are well formed");
# let reasoner = Reasoner::new(kb, ReasonerConfig::default());
# let base_rank = reasoner.base_rank().expect("the classical statements are consistent");
let query = "b~>w".parse().expect("the query is well formed");
let result = reasoner
    .entail(&query, Algorithm::Lexicographic, &base_rank)
    .expect("the query only uses atoms of the knowledge base");
assert!(result.entailed());
for justification in &result.common().justification {
    println!("{:?}", justification);
}
```
### compare all closure operations
The closure operations share the ranking and run in parallel.
```rust
# use klm_closure::datatypes::KnowledgeBase;
# use klm_closure::reasoner::{Reasoner, ReasonerConfig};
# let kb = KnowledgeBase::parse(["b=>p", "p~>f", "p~>w", "b~>!f"]).expect("the statements are well formed");
# let reasoner = Reasoner::new(kb, ReasonerConfig::default());
# let base_rank = reasoner.base_rank().expect("the classical statements are consistent");
let query = "b~>w".parse().expect("the query is well formed");
let results = reasoner.entail_all(&query, &base_rank).expect("no time limit is set");
let entailed = results.iter().map(|result| result.entailed()).collect::<Vec<_>>();
// rational closure loses `p~>w` together with `p~>f`
assert_eq!(entailed, vec![false, true, true, true]);
```

### Benchmarking the implementations together with the [`crossbeam-channel`] based evaluation
Every generated knowledge base is evaluated on its own worker thread.
```rust
use klm_closure::evaluation::{EvaluationRequest, GeneratorConfig, Implementation};
let request = EvaluationRequest {
    generators: vec![GeneratorConfig { ranks: 3, statements: 6, ..Default::default() }],
    algorithms: vec![Implementation::RationalBinary, Implementation::LexicalNaive],
    ..Default::default()
};
for report in request.run().expect("generated knowledge bases are consistent") {
    assert_eq!(report.ranks, 3);
    for timing in report.timings {
        println!("{}: {}s", timing.implementation, timing.average_time);
    }
}
```
*/
#![deny(
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![warn(
    missing_docs,
    unused_import_braces,
    unused_qualifications,
    unused_extern_crates,
    variant_size_differences
)]

pub mod baserank;
pub mod closure;
pub mod datatypes;
pub mod error;
pub mod evaluation;
pub mod justification;
pub mod oracle;
pub mod parser;
pub mod reasoner;
#[cfg(test)]
mod test;
