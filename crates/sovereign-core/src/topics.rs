//! Keyword-driven topic extraction from user messages.
//!
//! The table maps a topic name to the keywords that signal it. Matching is a
//! case-insensitive substring check against user messages only; assistant
//! output does not count toward mastery.

use std::collections::BTreeSet;

use crate::types::{Message, Role, Topic};

/// Topic keyword table. Data-driven so new topics don't touch the matcher.
const TOPIC_KEYWORDS: &[(&str, &[&str])] = &[
    // Programming languages
    ("JavaScript", &["javascript", "node", "react", "vue", "angular"]),
    ("Python", &["python", "django", "flask", "pandas", "numpy"]),
    ("Rust", &["rust", "cargo", "rustc"]),
    ("TypeScript", &["typescript"]),
    ("Java", &["java", "spring", "maven"]),
    ("C++", &["c++", "cpp"]),
    ("Go", &["golang"]),
    ("Solidity", &["solidity", "smart contract"]),
    // Web
    ("HTML", &["html"]),
    ("CSS", &["css", "tailwind", "bootstrap"]),
    ("Web Development", &["web dev", "frontend", "backend", "fullstack"]),
    // Blockchain
    ("Blockchain", &["blockchain", "distributed ledger"]),
    ("Solana", &["solana", "spl"]),
    ("Ethereum", &["ethereum", "evm"]),
    ("Web3", &["web3", "dapp", "defi"]),
    ("NFT", &["nft", "non-fungible"]),
    ("Cryptocurrency", &["crypto", "cryptocurrency", "bitcoin"]),
    // Mathematics
    ("Calculus", &["calculus", "derivative", "integral"]),
    ("Algebra", &["algebra", "equation", "polynomial"]),
    ("Statistics", &["statistics", "probability", "distribution"]),
    ("Linear Algebra", &["linear algebra", "matrix", "vector"]),
    ("Geometry", &["geometry", "triangle", "circle"]),
    // Science
    ("Physics", &["physics", "mechanics", "thermodynamics"]),
    ("Chemistry", &["chemistry", "molecule", "reaction"]),
    ("Biology", &["biology", "dna", "organism"]),
    // Computer science
    ("Algorithms", &["algorithm", "sorting", "searching", "complexity"]),
    ("Data Structures", &["data structure", "linked list", "binary tree"]),
    ("Machine Learning", &["machine learning", "neural network"]),
    ("Database", &["database", "sql", "nosql", "postgresql"]),
    ("API", &["rest api", "graphql", "endpoint"]),
    // Tooling
    ("Git", &["git", "github", "version control"]),
    ("Docker", &["docker", "container", "kubernetes"]),
    ("Testing", &["unit test", "integration test"]),
    ("Security", &["security", "encryption", "authentication"]),
];

/// Extract the topics signaled by the user messages in a conversation.
pub fn extract_topics(messages: &[Message]) -> BTreeSet<Topic> {
    let mut topics = BTreeSet::new();

    for message in messages.iter().filter(|m| m.role == Role::User) {
        let lower = message.content.to_lowercase();
        for (topic, keywords) in TOPIC_KEYWORDS {
            if keywords.iter().any(|k| lower.contains(k)) {
                topics.insert(Topic::new(*topic));
            }
        }
    }

    topics
}
