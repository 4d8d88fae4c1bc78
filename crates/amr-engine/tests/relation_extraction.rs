use amr_core::builder::build;
use amr_core::generation::TextGenerator;
use amr_core::grammar::Grammar;
use amr_core::ingest::extractor::{Extractor, PersonRelationExtractor};
use amr_core::ingest::IngestionEngine;
use amr_core::linear::Linearizer;
use amr_core::{Error, Graph, Result};
use async_trait::async_trait;
use pretty_assertions::assert_eq;

const TAKEOVER: &str = r#"
(z0 / appoint-01
    :ARG0 (z1 / company
              :wiki "Google"
              :name (z2 / name
                        :op1 "Google"))
    :ARG1 (z3 / person
              :wiki -
              :name (z4 / name
                        :op1 "John"
                        :op2 "Liu")
              :ARG0-of (z5 / have-org-role-91
                           :ARG1 z1
                           :ARG2 (z6 / chief
                                     :topic (z7 / sell-01))))
    :ARG2 (z8 / take-over-12
              :ARG0 z3
              :ARG1 (z9 / and
                        :op1 (z10 / responsible-03
                                  :ARG0 (z11 / person
                                             :wiki -
                                             :name (z12 / name
                                                        :op1 "Lee"))
                                  :ARG1 (z13 / business))
                        :op2 (z14 / responsible-03
                                  :ARG0 z11
                                  :ARG1 (z15 / operate-01)))))
"#;

fn relations(dual_invert: bool) -> Vec<Graph> {
    let tree = Grammar::shared().unwrap().parse(TAKEOVER).unwrap();
    let graph = build(&tree, dual_invert).unwrap();
    PersonRelationExtractor.extract(&graph)
}

fn root_concepts(relations: &[Graph]) -> Vec<String> {
    relations
        .iter()
        .map(|g| g.node(g.root().unwrap()).concept().unwrap().to_string())
        .collect()
}

#[test]
fn test_takeover_relations() {
    let found = relations(true);
    assert_eq!(
        root_concepts(&found),
        vec![
            "appoint-01",
            "have-org-role-91",
            "take-over-12",
            "take-over-12",
            "responsible-03",
            "responsible-03",
        ]
    );

    // the conjunction splits the take-over into one relation per operand
    let objects: Vec<String> = found[2..4]
        .iter()
        .map(|g| {
            let object = g.get(g.root().unwrap(), "ARG1").unwrap();
            g.node(object).name().to_string()
        })
        .collect();
    assert_eq!(objects, vec!["z10", "z14"]);
}

#[test]
fn test_inverted_role_needs_dual_bookkeeping() {
    let found = relations(false);
    assert!(!root_concepts(&found).contains(&"have-org-role-91".to_string()));
    assert_eq!(found.len(), 5);
}

#[test]
fn test_relation_tree_report() {
    let found = relations(true);
    let appoint = &found[0];
    let tree = appoint.pretty_tree(appoint.root().unwrap());
    assert_eq!(
        tree,
        "[z0 / appoint-01]
--> ARG0
        [z1 / company]
        --> name
                [z2 / name]
                --> op1
                        Google
--> ARG1
        [z3 / person]
        --> name
                [z4 / name]
                --> op1
                        John
                --> op2
                        Liu
--> ARG2
        [z8 / take-over-12]
"
    );
}

struct Echo;

#[async_trait]
impl TextGenerator for Echo {
    async fn generate(&self, amrs: &[String]) -> Result<Vec<String>> {
        Ok(amrs.iter().map(|a| format!("text for {}", a.len())).collect())
    }
}

struct Short;

#[async_trait]
impl TextGenerator for Short {
    async fn generate(&self, _amrs: &[String]) -> Result<Vec<String>> {
        Ok(vec!["only one".to_string()])
    }
}

#[tokio::test]
async fn test_generation_pipeline() {
    let engine = IngestionEngine::new(Grammar::shared().unwrap(), Linearizer::plain());
    let content = format!("# ::snt Google appointed John Liu.\n{}\n", TAKEOVER.trim());
    let records = engine.extract_relations(&content, "takeover.txt");
    assert_eq!(records.len(), 6);
    assert!(records.iter().all(|r| r.sentence == "Google appointed John Liu."));
    assert!(records.iter().all(|r| r.provenance.source == "takeover.txt"));

    let texts = engine.generate_texts(records.clone(), &Echo).await.unwrap();
    assert_eq!(texts.len(), 6);
    assert_eq!(texts[0].1, format!("text for {}", records[0].amr.len()));

    let err = engine.generate_texts(records, &Short).await.unwrap_err();
    assert!(matches!(err, Error::Generation(_)));
}

#[tokio::test]
async fn test_generator_as_trait_object() {
    let engine = IngestionEngine::new(Grammar::shared().unwrap(), Linearizer::plain());
    let generator: Box<dyn TextGenerator> = Box::new(Echo);
    let texts = engine.generate_texts(Vec::new(), generator.as_ref()).await.unwrap();
    assert!(texts.is_empty());
}
