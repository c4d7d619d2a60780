//! Neo4j backend
//!
//! Names and confidences always travel as query parameters. Labels and
//! relationship types cannot be parameterised in Cypher, so they are spliced
//! in only after [`Label`] / [`RelType`] validation.

use async_trait::async_trait;
use neo4rs::{ConfigBuilder, Graph, Query, Row, query};
use tracing::{debug, info};

use crate::config::{Neo4jConfig, Neo4jCredentials};
use crate::error::{Error, Result};

use super::repository::GraphRepository;
use super::types::{Edge, Label, NodeRef, RelType};

/// Cypher text for each graph operation
pub(crate) mod cypher {
    use super::{Label, RelType};

    fn label_clause(label: Option<&Label>) -> String {
        label.map(|l| format!(":{}", l)).unwrap_or_default()
    }

    pub fn find_node(label: Option<&Label>) -> String {
        format!(
            "MATCH (p{}) WHERE p.name = $name RETURN p.name AS name",
            label_clause(label)
        )
    }

    pub fn create_node(label: &Label) -> String {
        format!("MERGE (n:{} {{name: $name}}) RETURN n.name AS name", label)
    }

    pub fn find_edge(from: &Label, rel: &RelType, to: &Label) -> String {
        format!(
            "MATCH (n1:{} {{name: $from}})-[r:{}]->(n2:{} {{name: $to}}) \
             RETURN n1.name AS from, type(r) AS rel, n2.name AS to, r.confidence AS confidence \
             LIMIT 1",
            from, rel, to
        )
    }

    pub fn create_edge(from: &Label, rel: &RelType, to: &Label) -> String {
        format!(
            "MATCH (n1:{} {{name: $from}}), (n2:{} {{name: $to}}) \
             CREATE (n1)-[r:{} {{confidence: $confidence}}]->(n2) \
             RETURN count(r) AS affected",
            from, to, rel
        )
    }

    pub fn set_confidence(from: &Label, rel: &RelType, to: &Label) -> String {
        format!(
            "MATCH (n1:{} {{name: $from}})-[r:{}]->(n2:{} {{name: $to}}) \
             SET r.confidence = $confidence \
             RETURN count(r) AS affected",
            from, rel, to
        )
    }

    pub fn outgoing_edges(label: Option<&Label>) -> String {
        format!(
            "MATCH (n1{} {{name: $name}})-[r]->(n2) \
             RETURN n1.name AS from, type(r) AS rel, n2.name AS to, r.confidence AS confidence",
            label_clause(label)
        )
    }

    pub fn incoming_edges(label: Option<&Label>) -> String {
        format!(
            "MATCH (n1)-[r]->(n2{} {{name: $name}}) \
             RETURN n1.name AS from, type(r) AS rel, n2.name AS to, r.confidence AS confidence",
            label_clause(label)
        )
    }
}

/// Graph repository backed by a Neo4j server over Bolt
#[derive(Clone)]
pub struct Neo4jGraph {
    graph: Graph,
    uri: String,
    database: String,
}

impl std::fmt::Debug for Neo4jGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Neo4jGraph")
            .field("uri", &self.uri)
            .field("database", &self.database)
            .finish()
    }
}

impl Neo4jGraph {
    /// Connect using resolved credentials and the configured database
    pub async fn connect(config: &Neo4jConfig, credentials: &Neo4jCredentials) -> Result<Self> {
        let neo4j_config = ConfigBuilder::default()
            .uri(credentials.uri.as_str())
            .user(credentials.user.as_str())
            .password(credentials.password.as_str())
            .db(config.database.as_str())
            .build()?;

        let graph = Graph::connect(neo4j_config).await?;
        info!(uri = %credentials.uri, database = %config.database, "Connected to Neo4j");

        Ok(Self {
            graph,
            uri: credentials.uri.clone(),
            database: config.database.clone(),
        })
    }

    /// Run a query and collect every row
    async fn rows(&self, q: Query) -> Result<Vec<Row>> {
        let mut stream = self.graph.execute(q).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Run a write query that returns `affected`, failing if nothing matched
    async fn write_one(&self, q: Query, from: &NodeRef, to: &NodeRef) -> Result<()> {
        let rows = self.rows(q).await?;
        let affected = match rows.first() {
            Some(row) => get::<i64>(row, "affected")?,
            None => 0,
        };
        if affected == 0 {
            return Err(Error::NodeNotFound(format!("{} or {}", from, to)));
        }
        Ok(())
    }
}

fn get<T>(row: &Row, key: &str) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    row.get::<T>(key)
        .map_err(|e| Error::GraphDecode(format!("column '{}': {}", key, e)))
}

fn edge_from_row(row: &Row) -> Result<Edge> {
    Ok(Edge {
        from: get(row, "from")?,
        rel: get(row, "rel")?,
        to: get(row, "to")?,
        confidence: get::<Option<f64>>(row, "confidence")?,
    })
}

#[async_trait]
impl GraphRepository for Neo4jGraph {
    async fn find_node(&self, name: &str, label: Option<&Label>) -> Result<Vec<String>> {
        let cypher = cypher::find_node(label);
        debug!(%cypher, name, "Finding node");

        let rows = self.rows(query(&cypher).param("name", name)).await?;
        let names = rows
            .iter()
            .map(|row| get::<String>(row, "name"))
            .collect::<Result<Vec<_>>>()?;

        for found in &names {
            debug!(name = %found, "Found node");
        }
        Ok(names)
    }

    async fn create_node(&self, node: &NodeRef) -> Result<()> {
        let cypher = cypher::create_node(&node.label);
        self.graph
            .run(query(&cypher).param("name", node.name.as_str()))
            .await?;
        info!(node = %node, "Created node");
        Ok(())
    }

    async fn find_edge(
        &self,
        from: &NodeRef,
        rel: &RelType,
        to: &NodeRef,
    ) -> Result<Option<Edge>> {
        let cypher = cypher::find_edge(&from.label, rel, &to.label);
        debug!(%cypher, from = %from.name, to = %to.name, "Finding relationship");

        let rows = self
            .rows(
                query(&cypher)
                    .param("from", from.name.as_str())
                    .param("to", to.name.as_str()),
            )
            .await?;

        rows.first().map(edge_from_row).transpose()
    }

    async fn create_edge(
        &self,
        from: &NodeRef,
        rel: &RelType,
        to: &NodeRef,
        confidence: f64,
    ) -> Result<()> {
        let cypher = cypher::create_edge(&from.label, rel, &to.label);
        self.write_one(
            query(&cypher)
                .param("from", from.name.as_str())
                .param("to", to.name.as_str())
                .param("confidence", confidence),
            from,
            to,
        )
        .await
    }

    async fn set_confidence(
        &self,
        from: &NodeRef,
        rel: &RelType,
        to: &NodeRef,
        confidence: f64,
    ) -> Result<()> {
        let cypher = cypher::set_confidence(&from.label, rel, &to.label);
        self.write_one(
            query(&cypher)
                .param("from", from.name.as_str())
                .param("to", to.name.as_str())
                .param("confidence", confidence),
            from,
            to,
        )
        .await
    }

    async fn find_all_edges(&self, name: &str, label: Option<&Label>) -> Result<Vec<Edge>> {
        let mut edges = Vec::new();
        for cypher in [cypher::outgoing_edges(label), cypher::incoming_edges(label)] {
            let rows = self.rows(query(&cypher).param("name", name)).await?;
            for row in &rows {
                edges.push(edge_from_row(row)?);
            }
        }
        debug!(name, count = edges.len(), "Collected relationships");
        Ok(edges)
    }

    async fn health_check(&self) -> Result<()> {
        let rows = self.rows(query("RETURN 1 AS ok")).await?;
        match rows.first() {
            Some(row) if get::<i64>(row, "ok")? == 1 => Ok(()),
            _ => Err(Error::GraphDecode("health check returned no rows".to_string())),
        }
    }

    fn backend(&self) -> &'static str {
        "neo4j"
    }
}

#[cfg(test)]
mod tests {
    use super::cypher;
    use super::{Label, RelType};

    fn person() -> Label {
        Label::new("Person").unwrap()
    }

    #[test]
    fn test_find_node_with_and_without_label() {
        assert_eq!(
            cypher::find_node(Some(&person())),
            "MATCH (p:Person) WHERE p.name = $name RETURN p.name AS name"
        );
        assert_eq!(
            cypher::find_node(None),
            "MATCH (p) WHERE p.name = $name RETURN p.name AS name"
        );
    }

    #[test]
    fn test_edge_queries_bind_values_as_parameters() {
        let rel = RelType::new("knows").unwrap();
        for text in [
            cypher::find_edge(&person(), &rel, &person()),
            cypher::create_edge(&person(), &rel, &person()),
            cypher::set_confidence(&person(), &rel, &person()),
        ] {
            assert!(text.contains("$from"));
            assert!(text.contains("$to"));
            assert!(text.contains("[r:KNOWS"));
            assert!(!text.contains('\''));
        }
    }

    #[test]
    fn test_create_edge_is_directed() {
        let text = cypher::create_edge(&person(), &RelType::new("knows").unwrap(), &person());
        assert!(text.contains("CREATE (n1)-[r:KNOWS {confidence: $confidence}]->(n2)"));
    }

    #[test]
    fn test_neighbourhood_queries_cover_both_directions() {
        let out = cypher::outgoing_edges(Some(&person()));
        let inc = cypher::incoming_edges(None);
        assert!(out.starts_with("MATCH (n1:Person {name: $name})-[r]->(n2)"));
        assert!(inc.starts_with("MATCH (n1)-[r]->(n2 {name: $name})"));
    }
}
