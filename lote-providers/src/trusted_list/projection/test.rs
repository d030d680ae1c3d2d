use super::*;
use crate::anchor_source::router::QueryOutcome;
use crate::trusted_list::loader::LoaderParams;
use crate::trusted_list::model::{
    DigitalIdentity, EntityService, ListPointer, ServiceInformation, TrustedEntity,
};
use crate::verification::service_type;

fn service(type_identifier: &str, certificates: Vec<&str>) -> EntityService {
    EntityService {
        information: ServiceInformation {
            type_identifier: type_identifier.into(),
            status: None,
            digital_identity: Some(DigitalIdentity {
                x509_certificates: certificates
                    .into_iter()
                    .map(CertificateObject::new)
                    .collect(),
            }),
        },
    }
}

fn list_with_entities(scheme_type: &str, entities: Vec<Vec<EntityService>>) -> TrustedEntityList {
    TrustedEntityList {
        scheme_type: scheme_type.to_string(),
        pointers_to_other: vec![],
        entities: entities
            .into_iter()
            .map(|services| TrustedEntity {
                name: None,
                services,
            })
            .collect(),
        issue_date_time: None,
        next_update: None,
    }
}

fn certificates(contents: Vec<&str>) -> NonEmpty<CertificateObject> {
    NonEmpty::from_vec(contents.into_iter().map(CertificateObject::new).collect()).unwrap()
}

#[test]
fn test_projection_concatenates_in_declaration_order_with_duplicates() {
    let list = list_with_entities(
        "pid-providers",
        vec![
            vec![
                service(service_type::PID_PROVIDER, vec!["cert-1", "cert-2"]),
                service(service_type::PID_PROVIDER_STATUS, vec!["status-cert"]),
            ],
            vec![service(service_type::PID_PROVIDER, vec!["cert-2"])],
        ],
    );

    let anchors =
        anchors_with_service_type(&list, &service_type::PID_PROVIDER.into()).unwrap();

    assert_eq!(anchors, certificates(vec!["cert-1", "cert-2", "cert-2"]));
}

#[test]
fn test_projection_is_none_when_no_service_matches() {
    let list = list_with_entities(
        "pid-providers",
        vec![vec![service(service_type::PID_PROVIDER_STATUS, vec!["c"])]],
    );

    assert_eq!(
        anchors_with_service_type(&list, &service_type::PID_PROVIDER.into()),
        None
    );
}

#[test]
fn test_projection_is_none_when_matching_services_carry_no_certificates() {
    let list = list_with_entities(
        "pid-providers",
        vec![vec![service(service_type::PID_PROVIDER, vec![])]],
    );

    assert_eq!(
        anchors_with_service_type(&list, &service_type::PID_PROVIDER.into()),
        None
    );
}

#[tokio::test]
async fn test_list_anchor_source_serves_only_its_profile_purposes() {
    let list = Arc::new(list_with_entities(
        "pid-providers",
        vec![vec![service(service_type::PID_PROVIDER, vec!["pid-root"])]],
    ));
    let source = ListAnchorSource::for_profile(list, &ListProfile::PidProviders);

    assert_eq!(
        source.get(&VerificationContext::Pid).await.unwrap(),
        Some(certificates(vec!["pid-root"]))
    );
    // in the purpose set, but the list has no revocation service
    assert_eq!(
        source.get(&VerificationContext::PidStatus).await.unwrap(),
        None
    );
    // outside the purpose set entirely
    assert_eq!(source.get(&VerificationContext::Qeaa).await.unwrap(), None);
}

#[tokio::test]
async fn test_router_from_lists_routes_per_profile() {
    let pid_list = Arc::new(list_with_entities(
        "pid-providers",
        vec![vec![service(service_type::PID_PROVIDER, vec!["pid-root"])]],
    ));
    let wallet_list = Arc::new(list_with_entities(
        "wallet-providers",
        vec![vec![service(service_type::WALLET_PROVIDER, vec!["wp-root"])]],
    ));

    let router = router_from_lists(HashMap::from([
        (ListProfile::PidProviders, pid_list),
        (ListProfile::WalletProviders, wallet_list),
    ]))
    .unwrap();

    assert_eq!(
        router.get(&VerificationContext::Pid).await.unwrap(),
        QueryOutcome::Found(certificates(vec!["pid-root"]))
    );
    assert_eq!(
        router
            .get(&VerificationContext::WalletInstanceAttestation)
            .await
            .unwrap(),
        QueryOutcome::Found(certificates(vec!["wp-root"]))
    );
    assert_eq!(
        router.get(&VerificationContext::Qeaa).await.unwrap(),
        QueryOutcome::NotSupported
    );
    // supported purpose whose service entry is absent from the list
    assert_eq!(
        router.get(&VerificationContext::PidStatus).await.unwrap(),
        QueryOutcome::MisconfiguredSource
    );
}

#[test]
fn test_router_from_lists_requires_at_least_one_list() {
    assert_eq!(
        router_from_lists(HashMap::new()).err().unwrap(),
        RouterError::EmptySupportedSet
    );
}

mod remote {
    use std::collections::HashMap as StdHashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::trusted_list::fetcher::{DocumentFetcher, FetchError};

    struct StubFetcher {
        lists: StdHashMap<String, TrustedEntityList>,
        fetched: Mutex<usize>,
    }

    impl StubFetcher {
        fn new(lists: Vec<(&str, TrustedEntityList)>) -> Arc<Self> {
            Arc::new(Self {
                lists: lists
                    .into_iter()
                    .map(|(url, list)| (url.to_string(), list))
                    .collect(),
                fetched: Mutex::new(0),
            })
        }
    }

    #[async_trait::async_trait]
    impl DocumentFetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<TrustedEntityList, FetchError> {
            *self.fetched.lock().unwrap() += 1;
            self.lists
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::Http("status 404".to_string()))
        }
    }

    fn remote_source(fetcher: Arc<StubFetcher>, url: &str) -> RemoteListSource {
        let loader =
            Arc::new(TrustedListLoader::new(fetcher, LoaderParams::default()).unwrap());
        RemoteListSource::for_profile(loader, url, &ListProfile::PidProviders)
    }

    #[tokio::test]
    async fn test_remote_source_merges_primary_and_referenced_lists() {
        let mut root = list_with_entities(
            "pid-providers",
            vec![vec![service(service_type::PID_PROVIDER, vec!["root-cert"])]],
        );
        root.pointers_to_other = vec![ListPointer {
            location: "https://lists.example.eu/pid-de.json".to_string(),
            scheme_type: None,
        }];
        let referenced = list_with_entities(
            "pid-providers",
            vec![vec![service(service_type::PID_PROVIDER, vec!["de-cert"])]],
        );

        let fetcher = StubFetcher::new(vec![
            ("https://lists.example.eu/pid.json", root),
            ("https://lists.example.eu/pid-de.json", referenced),
        ]);
        let source = remote_source(fetcher, "https://lists.example.eu/pid.json");

        assert_eq!(
            source.get(&VerificationContext::Pid).await.unwrap(),
            Some(certificates(vec!["root-cert", "de-cert"]))
        );
    }

    #[tokio::test]
    async fn test_remote_source_applies_the_list_filter() {
        let mut root = list_with_entities(
            "pid-providers",
            vec![vec![service(service_type::PID_PROVIDER, vec!["root-cert"])]],
        );
        root.pointers_to_other = vec![ListPointer {
            location: "other".to_string(),
            scheme_type: None,
        }];
        let referenced = list_with_entities(
            "unrelated-profile",
            vec![vec![service(service_type::PID_PROVIDER, vec!["stray"])]],
        );

        let fetcher = StubFetcher::new(vec![
            ("root", root),
            ("other", referenced),
        ]);
        let source = remote_source(fetcher, "root")
            .with_list_filter(|list| list.scheme_type == "pid-providers");

        assert_eq!(
            source.get(&VerificationContext::Pid).await.unwrap(),
            Some(certificates(vec!["root-cert"]))
        );
    }

    #[tokio::test]
    async fn test_remote_source_skips_loading_for_foreign_purposes() {
        let fetcher = StubFetcher::new(vec![]);
        let source = remote_source(fetcher.clone(), "root");

        assert_eq!(source.get(&VerificationContext::Qeaa).await.unwrap(), None);
        assert_eq!(*fetcher.fetched.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_remote_source_surfaces_root_fetch_failures() {
        let fetcher = StubFetcher::new(vec![]);
        let source = remote_source(fetcher, "root");

        let result = source.get(&VerificationContext::Pid).await;

        assert!(matches!(result, Err(AnchorSourceError::Fetch(_))));
    }
}
