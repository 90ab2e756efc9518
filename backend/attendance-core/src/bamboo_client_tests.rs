// src/bamboo_client_tests.rs

#[cfg(test)]
mod tests {
    use crate::attendance_api::BatchEntryApi;
    use crate::attendance_client::*;
    use crate::bamboo_client::*;
    use crate::generator::EntryDescriptor;
    use chrono::NaiveDate;
    use reqwest::StatusCode;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bamboo(server: &MockServer) -> BambooApi {
        let client = ApiClient::new(ClientConfig::default()).unwrap();
        BambooApi::new(
            client,
            BambooEndpoints::new(&server.uri()).unwrap(),
            "csrf-123".to_string(),
            "42".to_string(),
        )
    }

    fn entry(day: u32, start: u32, end: u32, tracking_id: u64) -> EntryDescriptor {
        EntryDescriptor {
            date: date(2024, 5, day),
            start_minutes: start,
            end_minutes: end,
            break_minutes: 0,
            tracking_id,
        }
    }

    #[tokio::test]
    async fn test_create_entries_posts_one_batch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/timesheet/clock/entries"))
            .and(header(CSRF_HEADER, "csrf-123"))
            .and(body_json(json!({
                "entries": [
                    {
                        "id": null,
                        "trackingId": 1,
                        "employeeId": "42",
                        "date": "2024-05-06",
                        "start": "8:30",
                        "end": "13:00",
                        "note": ""
                    },
                    {
                        "id": null,
                        "trackingId": 2,
                        "employeeId": "42",
                        "date": "2024-05-06",
                        "start": "13:30",
                        "end": "17:00",
                        "note": ""
                    }
                ]
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let entries = vec![entry(6, 510, 780, 1), entry(6, 810, 1020, 2)];
        bamboo(&server).create_entries(&entries).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_batch_keeps_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/timesheet/clock/entries"))
            .respond_with(ResponseTemplate::new(403).set_body_string("Invalid CSRF token"))
            .expect(1)
            .mount(&server)
            .await;

        let err = bamboo(&server)
            .create_entries(&[entry(7, 510, 780, 1)])
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
        assert!(err.to_string().ends_with("Invalid CSRF token"));
    }

    #[test]
    fn test_endpoints_use_company_origin() {
        let endpoints = BambooEndpoints::new("https://acme.bamboohr.com/").unwrap();
        assert_eq!(
            endpoints.clock_entries(),
            "https://acme.bamboohr.com/timesheet/clock/entries"
        );
        assert!(matches!(
            BambooEndpoints::new("acme"),
            Err(RemoteError::InvalidUrl { .. })
        ));
    }
}
