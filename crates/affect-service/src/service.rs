//! Analysis facade.
//!
//! `idle → analyzing → done | failed-fallback`: each call runs to completion
//! and always yields a structurally valid graph. Remote failures degrade to
//! the local heuristic chain and are only visible in logs and in the
//! [`Resolved`] tag returned by [`EmotionService::analyze_resolved`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use affect_core::{
    expand, parse_response, Classifier, DominantEmotion, GlobalAffect, HeuristicClassifier,
    MultiEmotion, ParsedPayload,
};
use affect_graph::{
    cluster_by_primaries, cluster_by_valence, map_multi, merge_links, DomainGraph, Emotion,
    EnergyEngine, Galaxy, Link,
};
use model_client::{EmotionModel, ModelClient};

use crate::config::{ClusterStrategy, Route, ServiceConfig};
use crate::connectivity::ensure_cross_cluster;
use crate::outcome::{FallbackReason, Resolved};

/// Final artifact handed to consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionGraph {
    pub emotions: Vec<Emotion>,
    pub links: Vec<Link>,
    pub galaxies: Vec<Galaxy>,
    pub global: GlobalAffect,
}

/// Explicitly constructed analysis service.
pub struct EmotionService {
    config: ServiceConfig,
    classifier: Arc<dyn Classifier>,
    model: Option<Arc<dyn EmotionModel>>,
    /// Set when the remote route is configured but no client could be built.
    model_error: Option<String>,
    energy: EnergyEngine,
}

impl EmotionService {
    /// Build a service; a model client is created only when the configured
    /// route is remote.
    pub fn new(config: ServiceConfig) -> Self {
        let (model, model_error) = match config.route() {
            Route::Local => (None, None),
            Route::Remote => match ModelClient::new(config.model.clone()) {
                Ok(client) => (Some(Arc::new(client) as Arc<dyn EmotionModel>), None),
                Err(e) => {
                    warn!("Failed to build model client: {}", e);
                    (None, Some(e.to_string()))
                }
            },
        };

        Self {
            config,
            classifier: Arc::new(HeuristicClassifier::new()),
            model,
            model_error,
            energy: EnergyEngine::new(),
        }
    }

    /// Build a service around a given remote collaborator.
    pub fn with_model(config: ServiceConfig, model: Arc<dyn EmotionModel>) -> Self {
        Self {
            config,
            classifier: Arc::new(HeuristicClassifier::new()),
            model: Some(model),
            model_error: None,
            energy: EnergyEngine::new(),
        }
    }

    /// Replace the local classifier.
    pub fn with_classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Route the next analysis will take.
    pub fn route(&self) -> Route {
        self.config.route()
    }

    /// Analyze text into a graph. Never fails.
    pub async fn analyze(&self, text: &str) -> EmotionGraph {
        self.analyze_resolved(text).await.into_inner()
    }

    /// Analyze text, keeping whether a fallback happened.
    pub async fn analyze_resolved(&self, text: &str) -> Resolved<EmotionGraph> {
        let multi = match self.route() {
            Route::Local => self.local_multi(text),
            Route::Remote => self.remote_multi(text).await,
        };

        if let Some(reason) = multi.reason() {
            warn!(%reason, "analysis fell back to local heuristic");
        }
        multi.map(|multi| self.build_graph(&multi))
    }

    /// Classify and expand locally, without graph synthesis.
    pub fn classify(&self, text: &str) -> (DominantEmotion, MultiEmotion) {
        let dominant = self.classifier.classify(text);
        let multi = self.expand_or_neutral(&dominant).into_inner();
        (dominant, multi)
    }

    fn local_multi(&self, text: &str) -> Resolved<MultiEmotion> {
        let dominant = self.classifier.classify(text);
        debug!(label = %dominant.label, "local classification");
        self.expand_or_neutral(&dominant)
    }

    async fn remote_multi(&self, text: &str) -> Resolved<MultiEmotion> {
        let Some(model) = &self.model else {
            let reason = self
                .model_error
                .clone()
                .unwrap_or_else(|| "no model client configured".to_string());
            return self.fall_back(text, FallbackReason::ModelUnavailable(reason));
        };

        let raw = match model.infer(text).await {
            Ok(raw) => raw,
            Err(e) => return self.fall_back(text, FallbackReason::Remote(e.to_string())),
        };

        match parse_response(&raw) {
            Ok(ParsedPayload::Strict(multi)) => {
                info!(emotions = multi.emotions.len(), "accepted strict model payload");
                Resolved::Ok(multi)
            }
            Ok(ParsedPayload::Permissive(dominant)) => {
                info!(label = %dominant.label, "accepted permissive model payload");
                match expand(&dominant) {
                    Ok(multi) => Resolved::Ok(multi),
                    Err(e) => self.fall_back(text, FallbackReason::Contract(e.to_string())),
                }
            }
            Err(e) => self.fall_back(text, FallbackReason::MalformedResponse(e.to_string())),
        }
    }

    fn fall_back(&self, text: &str, reason: FallbackReason) -> Resolved<MultiEmotion> {
        let local = self.local_multi(text);
        match local {
            // Keep the local contract failure, if any.
            Resolved::Fallback { .. } => local,
            Resolved::Ok(data) => Resolved::fallback(reason, data),
        }
    }

    /// Expand, degrading to a lone neutral node on contract violations.
    fn expand_or_neutral(&self, dominant: &DominantEmotion) -> Resolved<MultiEmotion> {
        match expand(dominant) {
            Ok(multi) => Resolved::Ok(multi),
            Err(e) => {
                let neutral = HeuristicClassifier::new().classify("");
                let data = match expand(&neutral) {
                    Ok(multi) => multi,
                    Err(_) => MultiEmotion {
                        version: 1,
                        emotions: Vec::new(),
                        global: GlobalAffect::default(),
                        pairs: Vec::new(),
                    },
                };
                Resolved::fallback(FallbackReason::Contract(e.to_string()), data)
            }
        }
    }

    /// Map, enrich with energy rules, merge, connect and cluster.
    fn build_graph(&self, multi: &MultiEmotion) -> EmotionGraph {
        let DomainGraph { emotions, links } = map_multi(multi);
        let rule_links = self.energy.apply(&emotions);
        let mut links = merge_links(&[&links, &rule_links]);
        ensure_cross_cluster(&emotions, &mut links);

        let galaxies = match self.config.clusters {
            ClusterStrategy::Primaries => cluster_by_primaries(&emotions),
            ClusterStrategy::Valence => cluster_by_valence(&emotions),
        };

        debug!(
            emotions = emotions.len(),
            links = links.len(),
            galaxies = galaxies.len(),
            "graph built"
        );

        EmotionGraph {
            emotions,
            links,
            galaxies,
            global: multi.global,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use affect_graph::{primary_cluster_of, LinkKind};
    use model_client::ClientError;

    use crate::config::AnalysisMode;
    use crate::connectivity::has_cross_cluster_link;

    /// Returns a canned response and counts calls.
    struct StubModel {
        response: std::result::Result<String, u16>,
        calls: AtomicUsize,
    }

    impl StubModel {
        fn ok(body: &str) -> Arc<Self> {
            Arc::new(Self {
                response: Ok(body.to_string()),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(status: u16) -> Arc<Self> {
            Arc::new(Self {
                response: Err(status),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl EmotionModel for StubModel {
        async fn infer(&self, _text: &str) -> model_client::client::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.response {
                Ok(body) => Ok(body.clone()),
                Err(status) => Err(ClientError::Api {
                    status: *status,
                    message: "upstream down".into(),
                }),
            }
        }
    }

    fn online() -> ServiceConfig {
        ServiceConfig::default().with_mode(AnalysisMode::Online)
    }

    const ENVELOPE: &str = r##"Analysis follows.
    {"version": 1,
     "emotions": [
        {"label": "sadness", "weight": 0.8, "valence": -0.7, "arousal": 0.3, "intensity": 0.7,
         "colors": ["#5C6BC0"]},
        {"label": "nostalgia", "weight": 0.5, "valence": -0.1, "arousal": 0.3},
        {"label": "love", "weight": 0.3, "valence": 0.8, "arousal": 0.5}
     ],
     "global": {"valence": -0.4, "arousal": 0.3},
     "pairs": [["sadness", "nostalgia"], ["sadness", "love"]]}"##;

    #[tokio::test]
    async fn test_local_analysis() {
        let service = EmotionService::new(ServiceConfig::offline());
        let graph = service.analyze("gracias por todo, te amo").await;

        let labels: Vec<&str> = graph.emotions.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["joy", "love", "gratitude", "surprise"]);
        assert!(graph
            .links
            .iter()
            .any(|l| l.kind == LinkKind::Cooccurrence && l.id == "cooccurrence|joy-0->love-0"));
        assert!(graph.links.iter().any(|l| l.kind == LinkKind::Polarity));
        assert!(has_cross_cluster_link(&graph.emotions, &graph.links));
        assert!(!graph.galaxies.is_empty());
    }

    #[tokio::test]
    async fn test_empty_text_is_neutral_single_node() {
        let service = EmotionService::new(ServiceConfig::offline());
        let resolved = service.analyze_resolved("").await;
        assert!(!resolved.is_fallback());

        let graph = resolved.into_inner();
        assert_eq!(graph.emotions.len(), 1);
        assert_eq!(graph.emotions[0].id, "neutral-0");
        assert!(graph.links.is_empty());
        assert!(graph.galaxies.is_empty());
    }

    #[tokio::test]
    async fn test_strict_remote_payload() {
        let stub = StubModel::ok(ENVELOPE);
        let service = EmotionService::with_model(online(), stub.clone());
        let resolved = service.analyze_resolved("I miss the old house").await;

        assert!(!resolved.is_fallback());
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
        let graph = resolved.into_inner();
        let labels: Vec<&str> = graph.emotions.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["sadness", "nostalgia", "love"]);
        assert_eq!(graph.global.valence, -0.4);
        // sadness → nostalgia appears as both co-occurrence and polarity.
        assert!(graph.links.iter().any(|l| l.id == "polarity|sadness-0->nostalgia-0"));
    }

    #[tokio::test]
    async fn test_permissive_remote_payload_is_expanded() {
        let stub = StubModel::ok(
            r#"{"label": "fear", "intensity": 0.7, "relations": {"anger": 0.4, "calm": 0.9}}"#,
        );
        let service = EmotionService::with_model(online(), stub);
        let resolved = service.analyze_resolved("the exam is tomorrow").await;

        assert!(!resolved.is_fallback());
        let graph = resolved.into_inner();
        let labels: Vec<&str> = graph.emotions.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["fear", "calm", "anger"]);
        assert!(graph.links.iter().any(|l| l.id == "transition|fear-0->calm-0"));
    }

    #[tokio::test]
    async fn test_remote_failure_falls_back_once() {
        let stub = StubModel::failing(503);
        let service = EmotionService::with_model(online(), stub.clone());
        let resolved = service.analyze_resolved("estoy muy triste").await;

        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
        assert!(matches!(resolved.reason(), Some(FallbackReason::Remote(_))));
        assert_eq!(resolved.data().emotions[0].label, "sadness");
    }

    #[tokio::test]
    async fn test_dangling_pairs_fall_back_to_heuristic() {
        let body = ENVELOPE.replace(r#"["sadness", "love"]"#, r#"["sadness", "awe"]"#);
        let service = EmotionService::with_model(online(), StubModel::ok(&body));
        let resolved = service.analyze_resolved("I'm scared").await;

        assert!(matches!(
            resolved.reason(),
            Some(FallbackReason::MalformedResponse(_))
        ));
        assert_eq!(resolved.data().emotions[0].label, "fear");
    }

    #[tokio::test]
    async fn test_instances_are_independent() {
        let offline = EmotionService::new(
            ServiceConfig::offline().with_clusters(ClusterStrategy::Valence),
        );
        let remote = EmotionService::with_model(online(), StubModel::ok(ENVELOPE));

        assert_eq!(offline.route(), Route::Local);
        assert_eq!(remote.route(), Route::Remote);

        let a = offline.analyze("I'm so happy").await;
        let b = remote.analyze("I'm so happy").await;
        assert_eq!(a.galaxies.len(), 3);
        assert_eq!(a.emotions[0].label, "joy");
        assert_eq!(b.emotions[0].label, "sadness");
    }

    #[tokio::test]
    async fn test_online_without_client_falls_back() {
        let service = EmotionService {
            config: online(),
            model: None,
            ..EmotionService::new(ServiceConfig::offline())
        };
        let resolved = service.analyze_resolved("thank you").await;
        assert!(matches!(
            resolved.reason(),
            Some(FallbackReason::ModelUnavailable(_))
        ));
        assert_eq!(resolved.data().emotions[0].label, "gratitude");
    }

    #[tokio::test]
    async fn test_graph_connects_distinct_clusters() {
        let texts = [
            "gracias por todo, te amo",
            "estoy muy triste",
            "I'm scared of the dark",
            "this makes me furious",
            "I remember our summers",
            "wow, that was unexpected",
            "finally some peace and quiet",
            "what happens next?",
        ];
        let service = EmotionService::new(ServiceConfig::offline());
        for text in texts {
            let graph = service.analyze(text).await;
            let clusters: std::collections::HashSet<&str> = graph
                .emotions
                .iter()
                .filter_map(|e| primary_cluster_of(&e.label).map(|c| c.key))
                .collect();
            if graph.emotions.len() >= 2 && clusters.len() >= 2 {
                assert!(
                    has_cross_cluster_link(&graph.emotions, &graph.links),
                    "no cross-cluster link for {text:?}"
                );
            }
        }
    }

    #[test]
    fn test_graph_serializes() {
        let service = EmotionService::new(ServiceConfig::offline());
        let (_, multi) = service.classify("te quiero");
        let graph = service.build_graph(&multi);
        let json = serde_json::to_value(&graph).unwrap();
        assert!(json["emotions"].is_array());
        assert!(json["links"].is_array());
        assert!(json["galaxies"].is_array());
    }
}
