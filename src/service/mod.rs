//! `GraphRagService`: the context object every public entry point runs through.
//!
//! Owns the Graph Store behind a reader-writer lock, the query-level
//! configuration, the search backend and the entity-type sample cache.
//! Resolution holds the write lock for its whole pass; retrieval and search
//! only read.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::config::AppConfig;
use crate::graph::{build_graph, load_triples, BuildReport, GraphKind, GraphStats, GraphStore, ImportReport};
use crate::ranking::{
    filter_relations, merge_candidates, rank_entities, CoreEntityLock, FusionWeights, IntentRouter, QueryIntent,
};
use crate::resolution::{EntityResolver, ResolutionAudit};
use crate::retrieval::semantic::tokens;
use crate::retrieval::{RetrievalConfig, Retriever};
use crate::storage::{CacheStats, MemoryBackend, SearchBackend, TypeSampleCache, TypeSamples};
use crate::types::{
    AppError, GraphInput, HybridSearchRequest, QueryAnalysis, RankedResult, Result, RetrievalRequest,
    RetrievalResponse,
};

/// Start nodes used when a query names no node.
pub const FALLBACK_START_NODES: usize = 5;
/// Backend candidates fetched per returned slot, before fusion and filtering.
const FETCH_FACTOR: usize = 3;

/// What a graph file produced, by input format.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum LoadReport {
    Records(BuildReport),
    Triples(ImportReport),
}

pub struct GraphRagService {
    graph: RwLock<Option<GraphStore>>,
    config: RwLock<RetrievalConfig>,
    backend: RwLock<Option<Arc<dyn SearchBackend>>>,
    /// Set when the backend was supplied by the caller and must survive reloads.
    pinned_backend: bool,
    type_cache: TypeSampleCache,
    router: IntentRouter,
    lock: CoreEntityLock,
    resolver: EntityResolver,
    retriever: Retriever,
    resolution_threshold: f32,
    backend_timeout: Duration,
}

impl GraphRagService {
    pub fn new(app: &AppConfig) -> Self {
        let config = RetrievalConfig {
            deadline_ms: app.deadline_ms,
            ..Default::default()
        };
        Self {
            graph: RwLock::new(None),
            config: RwLock::new(config),
            backend: RwLock::new(None),
            pinned_backend: false,
            type_cache: TypeSampleCache::new(app.cache_capacity),
            router: IntentRouter::default(),
            lock: CoreEntityLock::default(),
            resolver: EntityResolver::default(),
            retriever: Retriever::default(),
            resolution_threshold: app.resolution_threshold,
            backend_timeout: Duration::from_millis(app.backend_timeout_ms),
        }
    }

    /// Uses `backend` for ranked search instead of an in-memory snapshot of the graph.
    pub fn with_backend(mut self, backend: Arc<dyn SearchBackend>) -> Self {
        self.backend = RwLock::new(Some(backend));
        self.pinned_backend = true;
        self
    }

    pub fn with_resolver(mut self, resolver: EntityResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_retriever(mut self, retriever: Retriever) -> Self {
        self.retriever = retriever;
        self
    }

    // ========== Graph lifecycle ==========

    pub async fn load_graph(&self, graph: GraphStore) -> Result<()> {
        tracing::info!(nodes = graph.node_count(), edges = graph.edge_count(), "Loading graph");
        let mut slot = self.graph.write().await;
        self.refresh_backend(Some(&graph)).await;
        *slot = Some(graph);
        Ok(())
    }

    pub async fn load_input(&self, input: &GraphInput, kind: GraphKind) -> Result<BuildReport> {
        let (graph, report) = build_graph(input, kind);
        self.load_graph(graph).await?;
        Ok(report)
    }

    /// Loads a `.json` record file, or tab-separated triples for any other extension.
    pub async fn load_path(&self, path: &Path, kind: GraphKind) -> Result<LoadReport> {
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json {
            let text = tokio::fs::read_to_string(path).await?;
            let input: GraphInput = serde_json::from_str(&text).map_err(|e| AppError::Parse {
                line: e.line(),
                reason: e.to_string(),
            })?;
            Ok(LoadReport::Records(self.load_input(&input, kind).await?))
        } else {
            let (graph, report) = load_triples(path, kind)?;
            self.load_graph(graph).await?;
            Ok(LoadReport::Triples(report))
        }
    }

    pub async fn is_loaded(&self) -> bool {
        self.graph.read().await.is_some()
    }

    /// Rebuilds the in-memory backend from `graph` and drops cached type samples.
    /// A pinned backend is left alone.
    async fn refresh_backend(&self, graph: Option<&GraphStore>) {
        self.type_cache.clear();
        if self.pinned_backend {
            return;
        }
        let next: Option<Arc<dyn SearchBackend>> =
            graph.map(|g| Arc::new(MemoryBackend::from_graph(g)) as Arc<dyn SearchBackend>);
        *self.backend.write().await = next;
    }

    /// Drops the graph and every derived cache.
    pub async fn shutdown(&self) {
        let mut slot = self.graph.write().await;
        *slot = None;
        self.type_cache.clear();
        if !self.pinned_backend {
            *self.backend.write().await = None;
        }
        tracing::info!("Service shut down");
    }

    // ========== Resolution ==========

    /// Runs entity resolution under the write lock. `threshold` defaults to the
    /// configured resolution threshold.
    pub async fn resolve_entities(&self, threshold: Option<f32>, dry_run: bool) -> Result<ResolutionAudit> {
        let threshold = threshold.unwrap_or(self.resolution_threshold);
        let mut slot = self.graph.write().await;
        let graph = slot.take().ok_or(AppError::GraphNotLoaded)?;
        let (graph, audit) = self.resolver.resolve(graph, threshold, dry_run);

        if !dry_run && audit.aborted.is_none() && audit.resolved_groups > 0 {
            self.refresh_backend(Some(&graph)).await;
        }
        *slot = Some(graph);
        Ok(audit)
    }

    // ========== Retrieval ==========

    pub async fn retrieve(&self, request: &RetrievalRequest) -> Result<RetrievalResponse> {
        let config = self.config.read().await.clone();
        let slot = self.graph.read().await;
        let graph = slot.as_ref().ok_or(AppError::GraphNotLoaded)?;

        let start_nodes = match &request.start_nodes {
            Some(nodes) => nodes.clone(),
            None => infer_start_nodes(graph, &request.query),
        };
        let output = self.retriever.run(
            config.retrieval_algorithm,
            Some(graph),
            &request.query,
            &start_nodes,
            &config,
        )?;

        let intent = self.router.route(&request.query);
        let core = self.lock.detect(&request.query);
        let mut query_analysis = analysis(intent, core, config.weights);
        query_analysis.algorithm = Some(config.retrieval_algorithm);
        query_analysis.start_nodes = start_nodes;

        Ok(RetrievalResponse { output, query_analysis })
    }

    // ========== Ranked search ==========

    pub async fn search(&self, query: &str) -> Result<RankedResult> {
        let config = self.config.read().await.clone();
        let backend = self.backend().await?;

        let intent = self.router.route(query);
        let core = self.lock.detect(query);
        tracing::debug!(intent = ?intent.intent, core = ?core, "Query analysed");

        let keyword_request = HybridSearchRequest {
            text: query.to_string(),
            keywords: core.iter().cloned().collect(),
            similarity_threshold: config.similarity_threshold,
            limit: config.ent_topn * FETCH_FACTOR,
            ..Default::default()
        };
        let by_keywords = self.call_backend(backend.search_entities(&keyword_request)).await?;

        let by_types = match self.searchable_type(&backend, &intent).await? {
            Some(entity_type) => {
                let type_request = HybridSearchRequest {
                    entity_types: vec![entity_type],
                    limit: config.ent_topn * FETCH_FACTOR,
                    ..Default::default()
                };
                self.call_backend(backend.entities_by_type(&type_request)).await?
            }
            None => Vec::new(),
        };

        let relation_request = HybridSearchRequest {
            text: query.to_string(),
            limit: config.rel_topn * FETCH_FACTOR,
            ..Default::default()
        };
        let relations = self.call_backend(backend.search_relations(&relation_request)).await?;

        let mut candidates = merge_candidates(by_keywords, by_types);
        if let Some(core) = &core {
            self.lock.apply(core, &mut candidates);
        }
        let entities = rank_entities(
            &candidates,
            query,
            &config.weights,
            &self.lock,
            core.as_deref(),
            config.ent_topn,
        );
        let relations = filter_relations(relations, &intent, config.rel_topn);

        tracing::info!(
            candidates = candidates.len(),
            entities = entities.len(),
            relations = relations.len(),
            "Ranked search complete"
        );
        Ok(RankedResult {
            entities,
            relations,
            query_analysis: analysis(intent, core, config.weights),
        })
    }

    /// Expected end type of the intent, if the backend holds any entity of it.
    async fn searchable_type(&self, backend: &Arc<dyn SearchBackend>, intent: &QueryIntent) -> Result<Option<String>> {
        let Some(expected) = &intent.expected_type else {
            return Ok(None);
        };
        let samples = self.samples_from(backend, &[]).await?;
        let found = samples.keys().find(|t| t.eq_ignore_ascii_case(expected)).cloned();
        if found.is_none() {
            tracing::debug!(expected = %expected, "No entities of expected type, skipping type fetch");
        }
        Ok(found)
    }

    /// A few entity names per type for the given namespaces, memoized per namespace set.
    pub async fn type_samples(&self, namespaces: &[String]) -> Result<TypeSamples> {
        let backend = self.backend().await?;
        self.samples_from(&backend, namespaces).await
    }

    async fn samples_from(&self, backend: &Arc<dyn SearchBackend>, namespaces: &[String]) -> Result<TypeSamples> {
        if let Some(samples) = self.type_cache.get(namespaces) {
            return Ok(samples);
        }
        let samples = self.call_backend(backend.entity_type_samples(namespaces)).await?;
        self.type_cache.put(namespaces, samples.clone());
        Ok(samples)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.type_cache.stats()
    }

    async fn backend(&self) -> Result<Arc<dyn SearchBackend>> {
        self.backend.read().await.clone().ok_or(AppError::GraphNotLoaded)
    }

    async fn call_backend<T, F>(&self, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.backend_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e @ AppError::Backend(_))) => Err(e),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Search backend call failed");
                Err(AppError::Backend(e.to_string()))
            }
            Err(_) => {
                let ms = self.backend_timeout.as_millis() as u64;
                tracing::warn!(timeout_ms = ms, "Search backend call timed out");
                Err(AppError::BackendTimeout(ms))
            }
        }
    }

    // ========== Configuration ==========

    pub async fn get_config(&self) -> std::collections::BTreeMap<String, String> {
        self.config.read().await.snapshot()
    }

    pub async fn get_config_value(&self, key: &str) -> Result<String> {
        self.config.read().await.get(key)
    }

    pub async fn set_config(&self, key: &str, value: &str) -> Result<()> {
        self.config.write().await.set(key, value)?;
        tracing::info!(key, value, "Config updated");
        Ok(())
    }

    pub async fn retrieval_config(&self) -> RetrievalConfig {
        self.config.read().await.clone()
    }

    // ========== Stats ==========

    pub async fn stats(&self) -> Result<GraphStats> {
        let slot = self.graph.read().await;
        slot.as_ref().map(GraphStore::stats).ok_or(AppError::GraphNotLoaded)
    }
}

fn analysis(intent: QueryIntent, core: Option<String>, weights: FusionWeights) -> QueryAnalysis {
    QueryAnalysis {
        intent: intent.intent,
        matched_intents: intent.matched,
        allow_list: intent.allow_list,
        deny_list: intent.deny_list,
        expected_type: intent.expected_type,
        hop_limit: intent.hop_limit,
        core_entity: core,
        weights_used: weights,
        algorithm: None,
        start_nodes: Vec::new(),
    }
}

/// Token sequence joined by single spaces and padded, for whole-token matching.
fn token_line(text: &str) -> String {
    let words: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect();
    format!(" {} ", words.join(" "))
}

/// Nodes whose display name appears as whole tokens in the query, in graph
/// order; the first few nodes when none do.
pub fn infer_start_nodes(graph: &GraphStore, query: &str) -> Vec<String> {
    let line = token_line(query);
    let matched: Vec<String> = if tokens(query).is_empty() {
        Vec::new()
    } else {
        graph
            .nodes()
            .filter(|node| {
                let label = token_line(node.label());
                !label.trim().is_empty() && line.contains(label.as_str())
            })
            .map(|node| node.id.clone())
            .collect()
    };
    if !matched.is_empty() {
        return matched;
    }
    graph.nodes().take(FALLBACK_START_NODES).map(|n| n.id.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::IntentKind;
    use crate::retrieval::RetrievalAlgorithm;
    use crate::test_utils::{biomedical_graph, path_graph, TestContext};
    use crate::types::{Edge, EntityCandidate, Node, NodeSource, RelationCandidate};
    use async_trait::async_trait;
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn test_entry_points_before_load() {
        let service = GraphRagService::new(&AppConfig::default());
        assert!(matches!(
            service.retrieve(&RetrievalRequest::new("q")).await,
            Err(AppError::GraphNotLoaded)
        ));
        assert!(matches!(service.search("q").await, Err(AppError::GraphNotLoaded)));
        assert!(matches!(service.stats().await, Err(AppError::GraphNotLoaded)));
        assert!(matches!(
            service.resolve_entities(None, false).await,
            Err(AppError::GraphNotLoaded)
        ));
    }

    #[tokio::test]
    async fn test_load_from_json_file() {
        let ctx = TestContext::new().await;
        let stats = ctx.service.stats().await.unwrap();
        assert_eq!(stats.node_count, biomedical_graph().node_count());
        assert_eq!(stats.node_types.get("Gene"), Some(&5));
        assert!(ctx.service.is_loaded().await);
    }

    #[tokio::test]
    async fn test_load_triples_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.tsv");
        std::fs::write(&path, "A\tlinks\tB\nB\tlinks\tC\nbroken line\n").unwrap();

        let service = GraphRagService::new(&AppConfig::default());
        let report = service.load_path(&path, GraphKind::UNDIRECTED).await.unwrap();
        match report {
            LoadReport::Triples(r) => {
                assert_eq!(r.build.edges_added, 2);
                assert_eq!(r.malformed_lines, 1);
            }
            LoadReport::Records(_) => panic!("expected triple report"),
        }
        assert_eq!(service.stats().await.unwrap().node_count, 3);
    }

    #[tokio::test]
    async fn test_retrieve_with_explicit_start_nodes() {
        let service = GraphRagService::new(&AppConfig::default());
        service.load_graph(path_graph()).await.unwrap();
        service.set_config("retrieval_algorithm", "bfs").await.unwrap();
        service.set_config("max_depth", "2").await.unwrap();

        let response = service
            .retrieve(&RetrievalRequest::new("walk").with_start_nodes(["A"]))
            .await
            .unwrap();
        assert_eq!(response.output.node_ids(), vec!["A", "B", "C"]);
        assert_eq!(response.output.edges.len(), 2);
        assert_eq!(response.query_analysis.algorithm, Some(RetrievalAlgorithm::Bfs));
        assert_eq!(response.query_analysis.intent, IntentKind::Mixed);
        assert_eq!(response.query_analysis.hop_limit, 3);
    }

    #[tokio::test]
    async fn test_start_nodes_inferred_from_query() {
        let graph = biomedical_graph();
        let starts = infer_start_nodes(&graph, "Is TP53 linked to breast cancer?");
        assert_eq!(starts, vec!["Gene::TP53", "Disease::breast_cancer"]);

        let fallback = infer_start_nodes(&graph, "nothing matches here");
        assert_eq!(fallback.len(), FALLBACK_START_NODES);
        assert_eq!(fallback[0], graph.node_ids()[0]);
    }

    #[tokio::test]
    async fn test_hybrid_retrieval_response() {
        let ctx = TestContext::new().await;
        let response = ctx
            .service
            .retrieve(&RetrievalRequest::new("genes that covary with TP53"))
            .await
            .unwrap();
        assert_eq!(response.query_analysis.allow_list, vec!["GcG"]);
        assert_eq!(response.query_analysis.start_nodes, vec!["Gene::TP53"]);
        let tp53 = response.output.nodes.iter().find(|n| n.id == "Gene::TP53").unwrap();
        assert_eq!(tp53.source, Some(NodeSource::Hybrid));

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("nodes").is_some());
        assert!(json["query_analysis"].get("weights_used").is_some());
    }

    #[tokio::test]
    async fn test_disabled_strategy_is_reported() {
        let ctx = TestContext::new().await;
        ctx.service.set_config("enable_n_hop_search", "false").await.unwrap();
        ctx.service.set_config("retrieval_algorithm", "n_hop").await.unwrap();
        let err = ctx.service.retrieve(&RetrievalRequest::new("TP53")).await.unwrap_err();
        assert!(matches!(err, AppError::StrategyDisabled(_)));
    }

    #[tokio::test]
    async fn test_config_interface() {
        let service = GraphRagService::new(&AppConfig::default());
        assert_eq!(service.get_config().await.len(), RetrievalConfig::KEYS.len());
        assert!(matches!(
            service.set_config("nope", "1").await,
            Err(AppError::UnknownConfigKey(_))
        ));
        assert!(matches!(
            service.set_config("retrieval_algorithm", "astar").await,
            Err(AppError::InvalidConfigValue { .. })
        ));
        assert!(service.set_config("max_nodes", "0").await.is_err());
        assert_eq!(service.get_config_value("max_nodes").await.unwrap(), "20");
        service.set_config("ent_topn", "3").await.unwrap();
        assert_eq!(service.get_config_value("ent_topn").await.unwrap(), "3");
        assert_eq!(service.get_config_value("retrieval_algorithm").await.unwrap(), "hybrid");
    }

    #[tokio::test]
    async fn test_search_covariance_query() {
        let ctx = TestContext::new().await;
        let result = ctx.service.search("genes that covary with TP53").await.unwrap();
        assert_eq!(result.query_analysis.intent, IntentKind::Covariance);
        assert_eq!(result.entities[0].name, "TP53");
        assert!(result.entities.len() <= 6);
        assert!(!result.relations.is_empty());
        assert!(result.relations.iter().all(|r| r.metaedge == "GcG"));
    }

    #[tokio::test]
    async fn test_search_locks_core_entity() {
        let ctx = TestContext::new().await;
        let result = ctx.service.search("role of p53 in breast cancer").await.unwrap();
        assert_eq!(result.query_analysis.core_entity.as_deref(), Some("TP53"));
        let core = result.entities.iter().find(|e| e.name == "TP53").unwrap();
        assert!(core.locked);
        assert!(result.relations.iter().all(|r| r.metaedge != "DrD"));
    }

    #[tokio::test]
    async fn test_type_samples_are_cached() {
        let ctx = TestContext::new().await;
        let first = ctx.service.type_samples(&[]).await.unwrap();
        let second = ctx.service.type_samples(&[]).await.unwrap();
        assert_eq!(first, second);
        let stats = ctx.service.cache_stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn test_resolution_under_write_lock() {
        let service = GraphRagService::new(&AppConfig::default());
        let mut graph = path_graph();
        assert!(graph.add_node(Node::new("a2", "a")));
        graph.add_edge(Edge::new("a2", "E", "r")).unwrap();
        service.load_graph(graph).await.unwrap();

        let preview = service.resolve_entities(Some(1.0), true).await.unwrap();
        assert!(preview.dry_run);
        assert_eq!(service.stats().await.unwrap().node_count, 6);

        let audit = service.resolve_entities(Some(1.0), false).await.unwrap();
        assert_eq!(audit.resolved_groups, 1);
        assert_eq!(service.stats().await.unwrap().node_count, 5);

        let again = service.resolve_entities(Some(1.0), false).await.unwrap();
        assert_eq!(again.resolved_groups, 0);
    }

    #[tokio::test]
    async fn test_negative_weight_edge_does_not_block_loading() {
        let service = GraphRagService::new(&AppConfig::default());
        let mut graph = GraphStore::new(GraphKind::UNDIRECTED);
        for id in ["A", "B", "C"] {
            graph.add_node(Node::new(id, id));
        }
        graph.add_edge(Edge::new("A", "B", "r")).unwrap();
        graph.add_edge(Edge::new("B", "C", "r").with_weight(-0.5)).unwrap();

        service.load_graph(graph).await.unwrap();
        assert!(service.is_loaded().await);

        service.set_config("retrieval_algorithm", "bfs").await.unwrap();
        let response = service
            .retrieve(&RetrievalRequest::new("walk").with_start_nodes(["A"]))
            .await
            .unwrap();
        let ids = response.output.node_ids();
        assert_eq!(ids.len(), 3);
        assert!(["A", "B", "C"].iter().all(|id| ids.contains(id)));

        let result = service.search("B").await.unwrap();
        let hit = result.entities.iter().find(|e| e.name == "B").unwrap();
        assert_eq!(hit.pagerank, 0.0);
    }

    #[tokio::test]
    async fn test_shutdown_drops_graph() {
        let ctx = TestContext::new().await;
        ctx.service.type_samples(&[]).await.unwrap();
        ctx.service.shutdown().await;
        assert!(!ctx.service.is_loaded().await);
        assert_eq!(ctx.service.cache_stats().size, 0);
        assert!(matches!(ctx.service.search("TP53").await, Err(AppError::GraphNotLoaded)));
    }

    #[tokio::test]
    async fn test_malformed_json_reports_line() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("graph.json");
        std::fs::write(&path, "{\n  \"entities\": [,]\n}\n").unwrap();

        let service = GraphRagService::new(&AppConfig::default());
        let err = service.load_path(&path, GraphKind::UNDIRECTED).await.unwrap_err();
        assert!(matches!(err, AppError::Parse { line: 2, .. }), "{err}");
        assert!(!service.is_loaded().await);
    }

    struct SlowBackend;

    #[async_trait]
    impl SearchBackend for SlowBackend {
        async fn search_entities(&self, _: &HybridSearchRequest) -> Result<Vec<EntityCandidate>> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Vec::new())
        }

        async fn entities_by_type(&self, _: &HybridSearchRequest) -> Result<Vec<EntityCandidate>> {
            Ok(Vec::new())
        }

        async fn search_relations(&self, _: &HybridSearchRequest) -> Result<Vec<RelationCandidate>> {
            Ok(Vec::new())
        }

        async fn entity_type_samples(&self, _: &[String]) -> Result<BTreeMap<String, Vec<String>>> {
            Ok(BTreeMap::new())
        }
    }

    #[tokio::test]
    async fn test_backend_timeout() {
        let app = AppConfig {
            backend_timeout_ms: 20,
            ..Default::default()
        };
        let service = GraphRagService::new(&app).with_backend(Arc::new(SlowBackend));
        let err = service.search("TP53").await.unwrap_err();
        assert!(matches!(err, AppError::BackendTimeout(20)));
    }

    struct BrokenBackend;

    #[async_trait]
    impl SearchBackend for BrokenBackend {
        async fn search_entities(&self, _: &HybridSearchRequest) -> Result<Vec<EntityCandidate>> {
            Err(AppError::Io("index file missing".to_string()))
        }

        async fn entities_by_type(&self, _: &HybridSearchRequest) -> Result<Vec<EntityCandidate>> {
            Ok(Vec::new())
        }

        async fn search_relations(&self, _: &HybridSearchRequest) -> Result<Vec<RelationCandidate>> {
            Ok(Vec::new())
        }

        async fn entity_type_samples(&self, _: &[String]) -> Result<BTreeMap<String, Vec<String>>> {
            Ok(BTreeMap::new())
        }
    }

    #[tokio::test]
    async fn test_backend_failure_surfaces_as_backend_error() {
        let service = GraphRagService::new(&AppConfig::default()).with_backend(Arc::new(BrokenBackend));
        let err = service.search("TP53").await.unwrap_err();
        assert!(matches!(&err, AppError::Backend(reason) if reason.contains("index file missing")));
    }
}
