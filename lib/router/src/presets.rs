//! Built-in topic classifier
//!
//! Three routes (GenAI programming, science fiction, classical music) with the
//! reference texts, thresholds and priorities of the demo router.

use crate::config::RoutingConfig;
use crate::definition::{RouteDefinition, RouterDefinition};
use serde_json::json;

pub const TOPIC_ROUTER_NAME: &str = "topic-classifier-router";

fn texts(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn genai_programming() -> RouteDefinition {
    RouteDefinition::new(
        "genai_programming",
        texts(&[
            "how to build a chatbot using GPT",
            "implementing RAG with vector databases",
            "fine-tuning large language models",
            "prompt engineering best practices",
            "building AI agents with LangChain",
            "vector embeddings for search",
            "transformer architecture explained",
            "creating custom AI models",
            "machine learning model deployment",
            "neural network programming",
            "deep learning frameworks",
            "AI model optimization techniques",
            "generative AI applications",
            "LLM integration patterns",
            "semantic search implementation",
        ]),
        0.70,
    )
    .with_priority(1)
    .with_metadata(json!({
        "category": "technology",
        "domain": "artificial_intelligence"
    }))
}

pub fn science_fiction() -> RouteDefinition {
    RouteDefinition::new(
        "science_fiction",
        texts(&[
            "best sci-fi movies of all time",
            "classic science fiction novels",
            "space opera recommendations",
            "cyberpunk literature and films",
            "time travel stories and paradoxes",
            "alien invasion movies",
            "dystopian future narratives",
            "Star Wars vs Star Trek debate",
            "Isaac Asimov robot stories",
            "Philip K. Dick adaptations",
            "blade runner and its themes",
            "interstellar travel concepts",
            "artificial intelligence in movies",
            "virtual reality fiction",
            "post-apocalyptic scenarios",
            "quantum physics in sci-fi",
            "space exploration adventures",
        ]),
        0.68,
    )
    .with_priority(2)
    .with_metadata(json!({
        "category": "entertainment",
        "genre": "science_fiction"
    }))
}

pub fn classical_music() -> RouteDefinition {
    RouteDefinition::new(
        "classical_music",
        texts(&[
            "Mozart symphonies and sonatas",
            "Bach fugues and cantatas",
            "Beethoven piano concertos",
            "Chopin nocturnes and etudes",
            "Vivaldi Four Seasons",
            "classical music composition techniques",
            "orchestra instrumentation guide",
            "baroque period composers",
            "romantic era classical music",
            "opera performances and arias",
            "chamber music ensembles",
            "classical music theory fundamentals",
            "famous conductors and performances",
            "classical music history timeline",
            "piano virtuoso performances",
            "string quartet repertoire",
            "classical music for beginners",
        ]),
        0.65,
    )
    .with_priority(3)
    .with_metadata(json!({
        "category": "arts",
        "genre": "classical_music"
    }))
}

/// The three-route topic classifier, reporting up to three matches per query
pub fn topic_router() -> RouterDefinition {
    RouterDefinition::new(
        TOPIC_ROUTER_NAME,
        vec![genai_programming(), science_fiction(), classical_music()],
    )
    .with_routing(RoutingConfig::default().with_max_k(3))
}

/// Sample queries: three per topic plus a few ambiguous ones
pub fn demo_queries() -> &'static [&'static str] {
    &[
        "How do I implement RAG with vector databases?",
        "What are the best practices for prompt engineering?",
        "How to fine-tune a large language model?",
        "What are the best cyberpunk movies?",
        "Recommend some good space opera novels",
        "Tell me about time travel paradoxes",
        "What are Mozart's most famous symphonies?",
        "Explain baroque music composition techniques",
        "Who are the greatest classical composers?",
        "Tell me about artificial intelligence",
        "What's new in entertainment?",
        "I love music recommendations",
    ]
}
