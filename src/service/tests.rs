//! Storage Service Tests
//!
//! End-to-end behavior through the public façade: every operation runs on the
//! executor and is observed through its `PendingResult`.
//!
//! ## Test Scopes
//! - **Round trip**: upload then download, overwrite, concurrent clients.
//! - **Placement**: copies land exactly on the placement set.
//! - **Failures**: missing ids, inconsistent metadata, unhealthy nodes, shutdown.
//! - **Config**: validation and flag parsing.

#[cfg(test)]
mod tests {
    use crate::error::StoreError;
    use crate::replication::{ResourceCheck, ResourceKind};
    use crate::service::config::ServiceConfig;
    use crate::service::service::StorageService;
    use bytes::Bytes;

    fn service(workers: usize, nodes: usize, factor: usize) -> StorageService {
        StorageService::start(ServiceConfig::new(workers, nodes, factor)).unwrap()
    }

    fn holders(service: &StorageService, id: &str) -> Vec<usize> {
        service
            .registry()
            .snapshot()
            .iter()
            .filter(|node| node.contains(id))
            .map(|node| node.index())
            .collect()
    }

    // ============================================================
    // ROUND TRIP
    // ============================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_three_nodes_factor_two_scenario() {
        let service = service(4, 3, 2);

        let report = service
            .upload_object("a", Bytes::from_static(b"hello"))
            .unwrap()
            .wait()
            .await
            .unwrap();

        let placement = service.placement_for("a").unwrap();
        assert_eq!(report.primary_node, placement.primary());
        assert!(report.is_fully_replicated());

        // Exactly two distinct nodes, and they are the placement set.
        let mut expected = placement.nodes().to_vec();
        expected.sort();
        assert_eq!(holders(&service, "a"), expected);

        let payload = service.download_object("a").unwrap().wait().await.unwrap();
        assert_eq!(payload, Bytes::from_static(b"hello"));

        let missing = service.download_object("missing").unwrap().wait().await;
        assert_eq!(
            missing,
            Err(StoreError::NotFound {
                id: "missing".to_string()
            })
        );

        service.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_metadata_points_at_primary() {
        let service = service(2, 5, 3);

        let report = service
            .upload_object("book-001", "Rust Programming")
            .unwrap()
            .wait()
            .await
            .unwrap();

        assert_eq!(
            service.metadata().locate("book-001").unwrap(),
            report.primary_node
        );
        assert!(
            service
                .registry()
                .get(report.primary_node)
                .unwrap()
                .contains("book-001")
        );
        assert_eq!(holders(&service, "book-001").len(), 3);

        service.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_overwrite_replaces_payload() {
        let service = service(2, 3, 2);

        service.upload_object("a", "v1").unwrap().wait().await.unwrap();
        service.upload_object("a", "v2").unwrap().wait().await.unwrap();

        let payload = service.download_object("a").unwrap().wait().await.unwrap();
        assert_eq!(payload, Bytes::from_static(b"v2"));
        assert_eq!(service.metadata().len(), 1);

        service.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_many_uploads_round_trip() {
        let service = service(4, 5, 3);

        let pending: Vec<_> = (0..200)
            .map(|i| {
                service
                    .upload_object(format!("obj-{}", i), format!("payload-{}", i))
                    .unwrap()
            })
            .collect();

        for upload in pending {
            let report = upload.wait().await.unwrap();
            assert_eq!(report.replication.copies(), 3);
        }

        for i in 0..200 {
            let payload = service
                .download_object(format!("obj-{}", i))
                .unwrap()
                .wait()
                .await
                .unwrap();
            assert_eq!(payload, Bytes::from(format!("payload-{}", i)));
        }

        let stats = service.stats();
        assert_eq!(stats.indexed_objects, 200);
        assert_eq!(stats.node_objects.iter().sum::<usize>(), 600);
        assert_eq!(stats.replication.passes, 200);

        service.shutdown().await;
    }

    // ============================================================
    // UNHEALTHY NODES
    // ============================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_download_reroutes_when_primary_unhealthy() {
        let service = service(2, 3, 2);
        let report = service
            .upload_object("a", "hello")
            .unwrap()
            .wait()
            .await
            .unwrap();

        service.mark_node_unhealthy(report.primary_node).unwrap();

        let payload = service.download_object("a").unwrap().wait().await.unwrap();
        assert_eq!(payload, Bytes::from_static(b"hello"));

        service.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_download_unavailable_when_every_holder_unhealthy() {
        let service = service(2, 3, 2);
        let report = service
            .upload_object("a", "hello")
            .unwrap()
            .wait()
            .await
            .unwrap();

        for &index in report.replication.placement.nodes() {
            service.mark_node_unhealthy(index).unwrap();
        }

        let result = service.download_object("a").unwrap().wait().await;
        assert_eq!(
            result,
            Err(StoreError::NodeUnavailable {
                node: report.primary_node
            })
        );

        // Recovery makes the object readable again.
        service.mark_node_healthy(report.primary_node).unwrap();
        let payload = service.download_object("a").unwrap().wait().await.unwrap();
        assert_eq!(payload, Bytes::from_static(b"hello"));

        service.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_upload_moves_primary_off_unhealthy_node() {
        let service = service(2, 3, 2);
        let placement = service.placement_for("a").unwrap();
        service.mark_node_unhealthy(placement.primary()).unwrap();

        let report = service
            .upload_object("a", "hello")
            .unwrap()
            .wait()
            .await
            .unwrap();

        assert_eq!(report.primary_node, placement.nodes()[1]);
        assert_eq!(service.metadata().locate("a").unwrap(), placement.nodes()[1]);
        assert!(!report.is_fully_replicated());
        assert_eq!(holders(&service, "a"), vec![placement.nodes()[1]]);

        let payload = service.download_object("a").unwrap().wait().await.unwrap();
        assert_eq!(payload, Bytes::from_static(b"hello"));

        service.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_upload_fails_when_placement_fully_unhealthy() {
        let service = service(2, 3, 2);
        let placement = service.placement_for("a").unwrap();
        for &index in placement.nodes() {
            service.mark_node_unhealthy(index).unwrap();
        }

        let result = service.upload_object("a", "hello").unwrap().wait().await;

        assert!(matches!(result, Err(StoreError::NodeUnavailable { .. })));
        assert!(service.metadata().is_empty());

        service.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_download_never_serves_overwritten_replica() {
        let service = service(2, 3, 2);
        let placement = service.placement_for("a").unwrap();
        let primary = placement.primary();
        let backup = placement.nodes()[1];

        service.upload_object("a", "v1").unwrap().wait().await.unwrap();
        assert_eq!(holders(&service, "a"), {
            let mut expected = vec![primary, backup];
            expected.sort();
            expected
        });

        // The overwrite misses the backup, which must not keep serving v1.
        service.mark_node_unhealthy(backup).unwrap();
        let report = service
            .upload_object("a", "v2")
            .unwrap()
            .wait()
            .await
            .unwrap();
        assert_eq!(report.primary_node, primary);
        assert_eq!(holders(&service, "a"), vec![primary]);

        service.mark_node_healthy(backup).unwrap();
        service.mark_node_unhealthy(primary).unwrap();

        let result = service.download_object("a").unwrap().wait().await;
        assert_eq!(result, Err(StoreError::NodeUnavailable { node: primary }));

        service.mark_node_healthy(primary).unwrap();
        let payload = service.download_object("a").unwrap().wait().await.unwrap();
        assert_eq!(payload, Bytes::from_static(b"v2"));

        service.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_health_check_drives_download_rerouting() {
        let service = service(2, 3, 2);
        let report = service
            .upload_object("a", "hello")
            .unwrap()
            .wait()
            .await
            .unwrap();

        let hot_node = report.primary_node;
        service.register_check(ResourceCheck::new(ResourceKind::Cpu, 0.8, move |node| {
            if node == hot_node { 0.97 } else { 0.1 }
        }));

        let health = service.check_health();
        assert_eq!(health.unhealthy, vec![hot_node]);

        let payload = service.download_object("a").unwrap().wait().await.unwrap();
        assert_eq!(payload, Bytes::from_static(b"hello"));

        service.shutdown().await;
    }

    // ============================================================
    // INCONSISTENCY & DEGENERATE PLACEMENT
    // ============================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_missing_primary_copy_is_inconsistent() {
        let service = service(2, 3, 2);
        let report = service
            .upload_object("a", "hello")
            .unwrap()
            .wait()
            .await
            .unwrap();

        service
            .registry()
            .get(report.primary_node)
            .unwrap()
            .remove("a");

        let result = service.download_object("a").unwrap().wait().await;
        assert_eq!(
            result,
            Err(StoreError::Inconsistent {
                id: "a".to_string(),
                node: report.primary_node
            })
        );

        service.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_factor_above_node_count_uses_every_node_once() {
        let service = service(2, 2, 3);

        let report = service
            .upload_object("a", "hello")
            .unwrap()
            .wait()
            .await
            .unwrap();

        assert_eq!(report.replication.copies(), 2);
        assert!(!report.is_fully_replicated());
        assert_eq!(holders(&service, "a"), vec![0, 1]);

        let payload = service.download_object("a").unwrap().wait().await.unwrap();
        assert_eq!(payload, Bytes::from_static(b"hello"));

        service.shutdown().await;
    }

    // ============================================================
    // ADMINISTRATION
    // ============================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_add_node_joins_future_placements() {
        let service = service(4, 3, 2);

        assert_eq!(service.add_node(), 3);

        let pending: Vec<_> = (0..200)
            .map(|i| service.upload_object(format!("obj-{}", i), "x").unwrap())
            .collect();
        for upload in pending {
            upload.wait().await.unwrap();
        }

        let stats = service.stats();
        assert_eq!(stats.node_count, 4);
        assert!(stats.node_objects[3] > 0, "new node should receive objects");

        service.shutdown().await;
    }

    #[tokio::test]
    async fn test_admin_calls_reject_unknown_node() {
        let service = service(1, 2, 1);

        assert_eq!(
            service.mark_node_unhealthy(9),
            Err(StoreError::UnknownNode { node: 9 })
        );
        assert_eq!(
            service.mark_node_healthy(9),
            Err(StoreError::UnknownNode { node: 9 })
        );

        service.shutdown().await;
    }

    #[tokio::test]
    async fn test_stats_reflect_health() {
        let service = service(3, 4, 2);
        service.mark_node_unhealthy(0).unwrap();

        let stats = service.stats();
        assert_eq!(stats.worker_count, 3);
        assert_eq!(stats.node_count, 4);
        assert_eq!(stats.healthy_nodes, 3);
        assert_eq!(stats.indexed_objects, 0);

        service.shutdown().await;
    }

    // ============================================================
    // SHUTDOWN
    // ============================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_shutdown_drains_uploads_then_rejects() {
        let service = service(2, 3, 2);

        let pending: Vec<_> = (0..100)
            .map(|i| service.upload_object(format!("obj-{}", i), "x").unwrap())
            .collect();

        service.shutdown().await;
        assert_eq!(service.metadata().len(), 100);

        for upload in pending {
            assert!(upload.wait().await.is_ok());
        }

        assert!(matches!(
            service.upload_object("late", "x"),
            Err(StoreError::TaskRejected)
        ));
        assert!(matches!(
            service.download_object("obj-1"),
            Err(StoreError::TaskRejected)
        ));
    }

    // ============================================================
    // CONFIG
    // ============================================================

    #[test]
    fn test_config_validation() {
        assert!(ServiceConfig::default().validate().is_ok());
        assert!(ServiceConfig::new(0, 3, 2).validate().is_err());
        assert!(ServiceConfig::new(1, 0, 1).validate().is_err());
        assert!(ServiceConfig::new(1, 3, 0).validate().is_err());
        // Over-replication is allowed, only warned about.
        assert!(ServiceConfig::new(1, 2, 5).validate().is_ok());
    }

    #[tokio::test]
    async fn test_start_rejects_invalid_config() {
        let result = StorageService::start(ServiceConfig::new(2, 0, 1));
        assert!(matches!(result, Err(StoreError::InvalidConfig(_))));
    }

    #[test]
    fn test_config_from_args() {
        let args = ["replicated-store", "--workers", "8", "--nodes", "5", "--replication", "3"]
            .into_iter()
            .map(String::from);

        let config = ServiceConfig::from_args(args).unwrap();
        assert_eq!(config, ServiceConfig::new(8, 5, 3));
    }

    #[test]
    fn test_config_from_args_defaults_and_errors() {
        let config = ServiceConfig::from_args(vec!["bin".to_string(), "--verbose".to_string()])
            .unwrap();
        assert_eq!(config, ServiceConfig::default());

        let missing = ServiceConfig::from_args(vec!["bin".to_string(), "--nodes".to_string()]);
        assert!(missing.is_err());

        let zero = ServiceConfig::from_args(
            ["bin", "--workers", "0"].into_iter().map(String::from),
        );
        assert!(zero.is_err());
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: ServiceConfig = serde_json::from_str(r#"{"node_count": 7}"#).unwrap();
        assert_eq!(config, ServiceConfig::new(4, 7, 2));
    }
}
