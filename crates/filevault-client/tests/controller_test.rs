//! Result-list controller behavior against a mock backend.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use filevault_api_client::{ApiClient, SessionContext};
use filevault_client::{EventBus, MutationEvent, ResultListController, ViewContext};
use filevault_core::models::SearchFilters;

fn client_for(server: &mockito::Server) -> ApiClient {
    let session = Arc::new(SessionContext::new(Some("token".to_string())));
    ApiClient::new(server.url(), session).expect("client")
}

/// A listing body with `count` files on the page and the given pagination.
fn page_body(count: usize, current_page: u32, total_pages: u32, total_files: u64) -> String {
    let files: Vec<String> = (0..count)
        .map(|i| {
            format!(
                r#"{{"id": {}, "filename": "file-{}.txt", "size_bytes": 100,
                    "mime_type": "text/plain", "created_at": "2024-03-01T12:00:00Z"}}"#,
                i + 1,
                i + 1
            )
        })
        .collect();
    format!(
        r#"{{"files": [{}], "pagination": {{"currentPage": {}, "totalPages": {}, "totalFiles": {}}}}}"#,
        files.join(","),
        current_page,
        total_pages,
        total_files
    )
}

#[tokio::test]
async fn delete_emptying_a_later_page_jumps_to_page_one() {
    let mut server = mockito::Server::new_async().await;
    // 41 files, page size 20: page 3 holds exactly one file.
    let page_three = server
        .mock("GET", "/files")
        .match_query(mockito::Matcher::AllOf(vec![
            mockito::Matcher::UrlEncoded("page".into(), "3".into()),
            mockito::Matcher::UrlEncoded("pageSize".into(), "20".into()),
        ]))
        .with_header("content-type", "application/json")
        .with_body(page_body(1, 3, 3, 41))
        .expect(1)
        .create_async()
        .await;
    let page_one = server
        .mock("GET", "/files")
        .match_query(mockito::Matcher::AllOf(vec![
            mockito::Matcher::UrlEncoded("page".into(), "1".into()),
            mockito::Matcher::UrlEncoded("pageSize".into(), "20".into()),
        ]))
        .with_header("content-type", "application/json")
        .with_body(page_body(20, 1, 2, 40))
        .expect(1)
        .create_async()
        .await;

    let controller = ResultListController::new(client_for(&server), ViewContext::list(3, 20));
    controller
        .set_view(ViewContext::list(3, 20))
        .await
        .expect("initial fetch");

    let page = controller.after_delete(1).await.expect("after delete");
    assert_eq!(page.pagination.current_page, 1);
    assert_eq!(
        controller.context(),
        ViewContext::list(1, 20),
        "the active view must move to page 1"
    );

    page_three.assert_async().await;
    page_one.assert_async().await;
}

#[tokio::test]
async fn delete_that_leaves_files_on_the_page_refetches_it() {
    let mut server = mockito::Server::new_async().await;
    // Fetched once on set_view and once after the delete.
    let page_two = server
        .mock("GET", "/files")
        .match_query(mockito::Matcher::AllOf(vec![
            mockito::Matcher::UrlEncoded("page".into(), "2".into()),
            mockito::Matcher::UrlEncoded("pageSize".into(), "20".into()),
        ]))
        .with_header("content-type", "application/json")
        .with_body(page_body(5, 2, 2, 25))
        .expect(2)
        .create_async()
        .await;

    let controller = ResultListController::new(client_for(&server), ViewContext::list(2, 20));
    controller
        .set_view(ViewContext::list(2, 20))
        .await
        .expect("initial fetch");

    let page = controller.after_delete(1).await.expect("after delete");
    assert_eq!(page.pagination.current_page, 2);
    assert_eq!(controller.context(), ViewContext::list(2, 20));

    page_two.assert_async().await;
}

#[tokio::test]
async fn delete_in_search_view_reissues_the_same_filters() {
    let mut server = mockito::Server::new_async().await;
    let search = server
        .mock("GET", "/search")
        .match_query(mockito::Matcher::AllOf(vec![
            mockito::Matcher::UrlEncoded("filename".into(), "report".into()),
            mockito::Matcher::UrlEncoded("page".into(), "1".into()),
        ]))
        .with_header("content-type", "application/json")
        .with_body(page_body(1, 1, 1, 1))
        .expect(2)
        .create_async()
        .await;

    let filters = SearchFilters {
        filename: Some("report".to_string()),
        page: Some(1),
        ..SearchFilters::default()
    };
    let controller =
        ResultListController::new(client_for(&server), ViewContext::search(filters.clone()));
    controller
        .set_view(ViewContext::search(filters.clone()))
        .await
        .expect("initial search");

    // Even when the delete emptied the result page, a search never jumps
    // to a list view; the same query runs again.
    controller.after_delete(1).await.expect("after delete");
    assert_eq!(controller.context(), ViewContext::search(filters));

    search.assert_async().await;
}

#[tokio::test]
async fn slow_fetch_for_an_abandoned_view_is_discarded() {
    let mut server = mockito::Server::new_async().await;
    let _slow_list = server
        .mock("GET", "/files")
        .match_query(mockito::Matcher::Any)
        .with_header("content-type", "application/json")
        .with_chunked_body(|writer| {
            std::thread::sleep(Duration::from_millis(150));
            writer.write_all(page_body(20, 1, 3, 41).as_bytes())
        })
        .create_async()
        .await;
    let _search = server
        .mock("GET", "/search")
        .match_query(mockito::Matcher::Any)
        .with_header("content-type", "application/json")
        .with_body(page_body(2, 1, 1, 2))
        .create_async()
        .await;

    let controller = ResultListController::new(client_for(&server), ViewContext::list(1, 20));
    let stale = tokio::spawn({
        let controller = controller.clone();
        async move { controller.set_view(ViewContext::list(1, 20)).await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let filters = SearchFilters {
        filename: Some("report".to_string()),
        ..SearchFilters::default()
    };
    controller
        .set_view(ViewContext::search(filters))
        .await
        .expect("search fetch");

    stale.await.unwrap().expect("stale fetch still succeeds");

    // The later view wins even though its response arrived first.
    let page = controller.current_page().expect("page applied");
    assert_eq!(page.pagination.total_files, 2);
}

#[tokio::test]
async fn delete_files_publishes_the_deleted_count() {
    let mut server = mockito::Server::new_async().await;
    let _one = server
        .mock("DELETE", "/files/1/delete")
        .create_async()
        .await;
    let _two = server
        .mock("DELETE", "/files/2/delete")
        .create_async()
        .await;

    let events = EventBus::new();
    let mut rx = events.subscribe();

    let deleted = filevault_client::delete_files(&client_for(&server), &events, &[1, 2])
        .await
        .expect("delete");
    assert_eq!(deleted, 2);
    assert_eq!(
        rx.recv().await.unwrap(),
        MutationEvent::FilesDeleted { deleted_count: 2 }
    );
}

#[tokio::test]
async fn delete_failure_still_announces_prior_deletions() {
    let mut server = mockito::Server::new_async().await;
    let _one = server
        .mock("DELETE", "/files/1/delete")
        .create_async()
        .await;
    let _two = server
        .mock("DELETE", "/files/2/delete")
        .with_status(404)
        .with_body("no such file")
        .create_async()
        .await;

    let events = EventBus::new();
    let mut rx = events.subscribe();

    filevault_client::delete_files(&client_for(&server), &events, &[1, 2])
        .await
        .expect_err("second delete must fail");
    assert_eq!(
        rx.recv().await.unwrap(),
        MutationEvent::FilesDeleted { deleted_count: 1 }
    );
}

#[tokio::test]
async fn upload_completed_event_refreshes_the_current_view() {
    let mut server = mockito::Server::new_async().await;
    let list = server
        .mock("GET", "/files")
        .match_query(mockito::Matcher::Any)
        .with_header("content-type", "application/json")
        .with_body(page_body(3, 1, 1, 3))
        .expect(2)
        .create_async()
        .await;

    let controller = ResultListController::new(client_for(&server), ViewContext::list(1, 20));
    controller
        .set_view(ViewContext::list(1, 20))
        .await
        .expect("initial fetch");

    let events = EventBus::new();
    let listener = controller.listen(events.subscribe());
    events.publish(MutationEvent::UploadCompleted {
        success_count: 1,
        deduplicated_count: 0,
    });
    tokio::time::sleep(Duration::from_millis(100)).await;
    listener.abort();

    list.assert_async().await;
}
