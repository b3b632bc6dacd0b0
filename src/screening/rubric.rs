/// A weighted keyword category.
///
/// Keywords are lowercase substrings matched against lowercased text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Criterion {
    /// Stable category key, e.g. "golang"
    pub key: &'static str,
    /// Relative importance; also the category's maximum score
    pub weight: f64,
    pub label: &'static str,
    pub keywords: &'static [&'static str],
}

/// An ordered set of categories. Order fixes output order, never scores.
pub type Rubric = [Criterion];

/// Lightning Labs engineering rubric.
pub const DEFAULT_RUBRIC: &Rubric = &[
    Criterion {
        key: "bitcoin_lightning",
        weight: 3.0,
        label: "Bitcoin & Lightning",
        keywords: &[
            "bitcoin", "lightning network", "lightning",
            "lnd", "btcd",
            "taproot", "segwit", "bolt spec", "bolt11", "bolt12",
            "htlc", "payment channel", "state channel",
            "on-chain", "layer 2", "layer-2", "l2 protocol",
            "satoshi", "sats", "utxo",
            "neutrino", "loop", "pool",
            "taproot assets", "taro",
            "lightning-terminal", "aperture", "lsat", "l402",
            "macaroon", "lnurl", "keysend", "amp",
            "bitcoin core", "bitcoind", "bitcoin improvement proposal",
            "bip", "lightning labs", "blockstream",
            "rgb protocol", "liquid network", "sidechain",
            "nostr", "dlc", "discreet log contract",
        ],
    },
    Criterion {
        key: "golang",
        weight: 2.5,
        label: "Go / Golang",
        keywords: &[
            "golang", "go language", "go programming",
            "goroutine", "goroutines",
            "go channel", "go channels",
            "grpc", "protobuf", "protocol buffers",
            "go mod", "go module", "go modules",
            "go test", "go vet", "go fmt",
            "cobra", "viper",
        ],
    },
    Criterion {
        key: "systems_languages",
        weight: 2.0,
        label: "Systems Languages",
        keywords: &[
            "rust", "rustlang", "cargo",
            "c++", "cpp", "c programming",
            "systems programming", "low-level", "low level",
            "memory management", "unsafe code",
            "llvm", "compiler", "linker",
        ],
    },
    Criterion {
        key: "distributed_systems",
        weight: 2.0,
        label: "Distributed Systems",
        keywords: &[
            "distributed systems", "distributed computing",
            "consensus", "consensus algorithm",
            "raft", "paxos", "pbft",
            "replication", "fault tolerance", "fault tolerant",
            "cap theorem", "eventual consistency",
            "distributed database", "distributed ledger",
            "etcd", "zookeeper",
            "cluster", "clustering",
            "peer-to-peer", "p2p", "gossip protocol",
            "state machine replication",
            "byzantine", "byzantine fault",
        ],
    },
    Criterion {
        key: "networking",
        weight: 2.0,
        label: "Networking & Protocols",
        keywords: &[
            "protocol engineering", "protocol design",
            "tcp", "udp", "quic",
            "networking", "network programming", "socket",
            "wire protocol", "transport layer",
            "tor", "onion routing", "noise protocol",
            "multiplexing", "muxer",
            "nat traversal", "hole punching",
            "dns", "dhcp", "bgp",
            "packet", "routing", "mesh network",
        ],
    },
    Criterion {
        key: "cryptography",
        weight: 2.0,
        label: "Cryptography & Security",
        keywords: &[
            "cryptography", "cryptographic",
            "encryption", "decryption",
            "elliptic curve", "ecdsa", "ed25519",
            "schnorr", "musig", "musig2",
            "threshold signature", "multisig", "multi-sig",
            "zero knowledge", "zk-snark", "zk-stark", "zkp",
            "hash function", "sha256", "sha-256",
            "digital signature", "signature scheme",
            "commitment scheme", "pedersen commitment",
            "key derivation", "hkdf", "pbkdf",
            "tls", "ssl", "pki",
            "secure multiparty computation", "mpc",
            "homomorphic",
            "security audit", "penetration testing", "pentest",
            "vulnerability", "cve", "bug bounty",
        ],
    },
    Criterion {
        key: "open_source",
        weight: 1.5,
        label: "Open Source",
        keywords: &[
            "open source", "open-source", "oss",
            "github", "gitlab",
            "contributor", "contributions",
            "maintainer", "core maintainer",
            "pull request", "code review",
            "foss", "free software",
            "apache license", "mit license", "bsd license",
        ],
    },
    Criterion {
        key: "phd_research",
        weight: 1.5,
        label: "PhD & Research",
        keywords: &[
            "phd", "ph.d", "ph.d.",
            "doctorate", "doctoral",
            "dissertation", "thesis",
            "research", "researcher",
            "publication", "published paper", "academic paper",
            "conference paper", "journal paper",
            "professor", "postdoc", "post-doc",
            "computer science", "mathematics",
        ],
    },
    Criterion {
        key: "operating_systems",
        weight: 1.0,
        label: "Operating Systems",
        keywords: &[
            "operating system", "operating systems",
            "kernel", "linux kernel", "kernel module",
            "linux", "unix", "posix",
            "embedded", "embedded systems",
            "firmware", "rtos",
            "device driver", "syscall", "system call",
            "memory allocator", "scheduler",
        ],
    },
];

/// Sum of all category weights
pub fn max_possible(rubric: &Rubric) -> f64 {
    rubric.iter().map(|c| c.weight).sum()
}
