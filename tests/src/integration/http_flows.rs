//! # HTTP Flow Tests
//!
//! Drives the gateway router with `oneshot` over a roll loaded by the
//! seed importer, the way the runtime wires it.

#[cfg(test)]
mod tests {
    use crate::fixtures::Election;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
        Router,
    };
    use ev_03_election_store::{import_seed, load_seed_file};
    use ev_04_api_gateway::{ElectionConfig, ElectionGateway};
    use serde_json::{json, Value};
    use shared_types::ElectionStore;
    use std::io::Write;
    use tower::ServiceExt;

    const SEED: &str = r#"{
        "candidates": [
            {"fullName": "Arun", "party": "Party A"},
            {"fullName": "Bina", "party": "Party B"}
        ],
        "voters": [
            {"Name": "Asha", "PIN": 1234, "Phone": "98765 43210"},
            {"Name": "Ravi", "PIN": "5678", "Phone": 9000000001},
            {"Name": "Short", "PIN": "12", "Phone": "9000000002"}
        ]
    }"#;

    async fn seeded() -> (Election, Router) {
        let election = Election::new();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SEED.as_bytes()).unwrap();
        let seed = load_seed_file(file.path()).unwrap();
        let report = import_seed(election.store.as_ref(), &seed).await;
        assert_eq!(report.inserted, 2);
        assert_eq!(report.skipped, 1);

        let gateway = ElectionGateway::new(
            ElectionConfig::default(),
            election.otp.clone(),
            election.ledger.clone(),
        )
        .unwrap();
        let router = gateway.router();
        (election, router)
    }

    async fn send(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response: Response = router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn post(uri: &str, body: Value, pass: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(pass) = pass {
            builder = builder.header("authorization", format!("Bearer {pass}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_voter_journey_over_http() {
        let (election, router) = seeded().await;
        let candidates = election.store.list_candidates().await.unwrap();
        let arun = candidates.iter().find(|c| c.full_name == "Arun").unwrap().id;

        let (status, body) = send(
            &router,
            post("/api/voters/send-otp", json!({ "phone": 9876543210u64 }), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert!(body.get("otp").is_none());

        let code = election.delivered_code("9876543210");
        let (status, body) = send(
            &router,
            post(
                "/api/voters/verify-otp",
                json!({ "phone": "+91 98765 43210", "otp": code }),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["hasVoted"], false);
        let voter_id = body["voterId"].as_str().unwrap().to_string();
        let pass = body["votingPass"].as_str().unwrap().to_string();

        let (status, body) = send(
            &router,
            post(
                "/api/voters/cast-vote",
                json!({ "voterId": voter_id, "candidateId": arun.to_string() }),
                Some(&pass),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["candidateVotes"], 1);

        let (status, body) = send(&router, get(&format!("/api/voters/status/{voter_id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["hasVoted"], true);

        let (_, body) = send(&router, get("/api/candidates/tally")).await;
        assert_eq!(body["candidates"][0]["fullName"], "Arun");
        assert_eq!(body["candidates"][0]["votes"], 1);
        assert_eq!(body["candidates"][1]["votes"], 0);

        let (status, body) = send(
            &router,
            post("/api/voters/send-otp", json!({ "phone": "9876543210" }), None),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["alreadyVoted"], true);
    }

    #[tokio::test]
    async fn test_skipped_roll_row_cannot_sign_in() {
        let (_, router) = seeded().await;
        let (status, body) = send(
            &router,
            post("/api/voters/send-otp", json!({ "phone": "9000000002" }), None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Voter not found");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (_, router) = seeded().await;
        let response = router.clone().oneshot(get("/api/nope")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
