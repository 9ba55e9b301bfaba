use std::path::Path;
use std::sync::atomic::Ordering;

use keeper_tls_harness::secure_raft_works;
use keeper_tls_harness::secure_raft_works_with_password;
use keeper_tls_harness::NodeState;
use keeper_tls_harness::TlsVariant;

use crate::common::enable_logger;
use crate::common::sim_cluster;
use crate::common::TLS_CONFIG;

/// # Case: the full passphrase matrix passes in order on one shared cluster
#[tokio::test]
async fn test_secure_raft_works_with_password() {
    enable_logger();
    let sim = sim_cluster();

    secure_raft_works_with_password(sim.harness.runner()).await.unwrap();

    // The last scenario is invalid: only the observer was restarted
    let states = sim.harness.cluster().states();
    assert_eq!(states[0].1, NodeState::Running);
    assert_eq!(states[1].1, NodeState::Stopped);
    assert_eq!(states[2].1, NodeState::Stopped);

    sim.harness.shutdown().await;
}

/// Both suites share the cluster the way they share one deployment
#[tokio::test]
async fn test_suites_run_back_to_back() {
    enable_logger();
    let sim = sim_cluster();

    secure_raft_works(sim.harness.runner()).await.unwrap();
    secure_raft_works_with_password(sim.harness.runner()).await.unwrap();
    secure_raft_works(sim.harness.runner()).await.unwrap();

    sim.harness.shutdown().await;
}

/// # Case: correct passphrase on the encrypted key behaves like plain certificates
#[tokio::test]
async fn test_correct_passphrase_converges() {
    enable_logger();
    let sim = sim_cluster();

    sim.harness
        .runner()
        .run_valid(&TlsVariant::with_passphrase("WithPassPhrase", "test"))
        .await
        .unwrap();

    let world = sim.world.lock();
    for (_, node) in &world.nodes {
        let tls = &node.files[Path::new(TLS_CONFIG)];
        assert!(tls.contains("WithPassPhrase.key"));
        assert!(tls.contains("password: 'test'"));
        assert!(node.znodes.contains_key("/test_node"));
    }
    drop(world);

    sim.harness.shutdown().await;
}

/// # Case: wrong, empty and missing passphrases are rejected by peers and never probed
#[tokio::test]
async fn test_rejected_passphrases_skip_probe() {
    enable_logger();
    let sim = sim_cluster();
    let runner = sim.harness.runner();

    for variant in [
        TlsVariant::with_passphrase("WithPassPhrase", "wrongpassword"),
        TlsVariant::with_passphrase("WithPassPhrase", ""),
        TlsVariant::plain("WithPassPhrase"),
    ] {
        runner.run_invalid(&variant).await.unwrap();

        let world = sim.world.lock();
        let observer = world.node("node1");
        assert!(observer.is_running());
        assert!(!observer.key_loaded, "{variant}");
        assert!(!world.node("node2").is_running());
        assert!(!world.node("node3").is_running());
    }

    assert_eq!(sim.connects.load(Ordering::SeqCst), 0);
    let world = sim.world.lock();
    assert_eq!(world.node("node1").starts, 3);
    assert_eq!(world.node("node2").starts, 0);
    drop(world);

    sim.harness.shutdown().await;
}

/// # Case: an empty passphrase still writes a passphrase handler
#[tokio::test]
async fn test_empty_passphrase_writes_handler() {
    enable_logger();
    let sim = sim_cluster();

    sim.harness
        .runner()
        .run_invalid(&TlsVariant::with_passphrase("WithPassPhrase", ""))
        .await
        .unwrap();

    let world = sim.world.lock();
    let tls = &world.node("node1").files[Path::new(TLS_CONFIG)];
    assert!(tls.contains("privateKeyPassphraseHandler"));
    assert!(tls.contains("password: ''"));
    assert!(!tls.contains("PASSWORD"));
    drop(world);

    sim.harness.shutdown().await;
}
