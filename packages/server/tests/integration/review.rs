use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn both_parties_review_each_other_once() {
    let app = TestApp::spawn().await;
    let u1 = app.sign_in("writer").await;
    let u2 = app.sign_in("buyer").await;
    let id = app.create_article(&u1.access, "Bike", 10000, vec![]).await;
    app.complete_trade(id, &u1, &u2).await;

    let res = app
        .post_with_token(
            routes::REVIEWS,
            &json!({ "articleId": id, "score": 5, "text": "Smooth deal" }),
            &u2.access,
        )
        .await;
    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["reviewerId"], u2.user_id);
    assert_eq!(res.body["revieweeId"], u1.user_id);
    assert_eq!(res.body["text"], "Smooth deal");

    let writer = app.user_row(u1.user_id).await;
    assert_eq!(writer.score, 5);
    assert_eq!(writer.review_count, 1);

    let res = app
        .post_with_token(
            routes::REVIEWS,
            &json!({ "articleId": id, "score": 4 }),
            &u1.access,
        )
        .await;
    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["revieweeId"], u2.user_id);

    let buyer = app.user_row(u2.user_id).await;
    assert_eq!(buyer.score, 4);
    assert_eq!(buyer.review_count, 1);

    let again = app
        .post_with_token(
            routes::REVIEWS,
            &json!({ "articleId": id, "score": 1 }),
            &u1.access,
        )
        .await;
    assert_eq!(again.status, 409);
    assert_eq!(again.body["code"], "CONFLICT");
    assert_eq!(app.user_row(u2.user_id).await.score, 4);
}

#[tokio::test]
async fn average_score_shows_on_the_profile() {
    let app = TestApp::spawn().await;
    let u1 = app.sign_in("writer").await;
    let u2 = app.sign_in("buyer").await;
    let u3 = app.sign_in("buyer2").await;

    for (buyer, score) in [(&u2, 5), (&u3, 2)] {
        let id = app.create_article(&u1.access, "Item", 1000, vec![]).await;
        app.complete_trade(id, &u1, buyer).await;
        let res = app
            .post_with_token(
                routes::REVIEWS,
                &json!({ "articleId": id, "score": score }),
                &buyer.access,
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
    }

    let profile = app.get_without_token(&routes::user(u1.user_id)).await;
    assert_eq!(profile.body["score"], 7);
    assert_eq!(profile.body["averageScore"], 3.5);
}

#[tokio::test]
async fn trade_must_be_complete() {
    let app = TestApp::spawn().await;
    let u1 = app.sign_in("writer").await;
    let u2 = app.sign_in("buyer").await;
    let id = app.create_article(&u1.access, "Bike", 10000, vec![]).await;
    let offer_id = app.place_offer(id, &u2.access, 9000).await;
    app.post_empty_with_token(&routes::select(offer_id), &u1.access)
        .await;

    let res = app
        .post_with_token(
            routes::REVIEWS,
            &json!({ "articleId": id, "score": 5 }),
            &u2.access,
        )
        .await;

    assert_eq!(res.status, 409);
    assert_eq!(app.user_row(u1.user_id).await.review_count, 0);
}

#[tokio::test]
async fn outsiders_cannot_review() {
    let app = TestApp::spawn().await;
    let u1 = app.sign_in("writer").await;
    let u2 = app.sign_in("buyer").await;
    let outsider = app.sign_in("outsider").await;
    let id = app.create_article(&u1.access, "Bike", 10000, vec![]).await;
    app.complete_trade(id, &u1, &u2).await;

    let res = app
        .post_with_token(
            routes::REVIEWS,
            &json!({ "articleId": id, "score": 5 }),
            &outsider.access,
        )
        .await;

    assert_eq!(res.status, 403);
    assert_eq!(res.body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn out_of_range_score_is_rejected() {
    let app = TestApp::spawn().await;
    let u1 = app.sign_in("writer").await;
    let u2 = app.sign_in("buyer").await;
    let id = app.create_article(&u1.access, "Bike", 10000, vec![]).await;
    app.complete_trade(id, &u1, &u2).await;

    for score in [0, 6] {
        let res = app
            .post_with_token(
                routes::REVIEWS,
                &json!({ "articleId": id, "score": score }),
                &u2.access,
            )
            .await;
        assert_eq!(res.status, 400, "score {score}");
    }
}

#[tokio::test]
async fn review_of_missing_article_is_not_found() {
    let app = TestApp::spawn().await;
    let u2 = app.sign_in("buyer").await;

    let res = app
        .post_with_token(
            routes::REVIEWS,
            &json!({ "articleId": 404, "score": 5 }),
            &u2.access,
        )
        .await;

    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn concurrent_duplicate_reviews_count_once() {
    let app = TestApp::spawn().await;
    let u1 = app.sign_in("writer").await;
    let u2 = app.sign_in("buyer").await;
    let id = app.create_article(&u1.access, "Bike", 10000, vec![]).await;
    app.complete_trade(id, &u1, &u2).await;
    let body = json!({ "articleId": id, "score": 5 });

    let (a, b) = tokio::join!(
        app.post_with_token(routes::REVIEWS, &body, &u2.access),
        app.post_with_token(routes::REVIEWS, &body, &u2.access),
    );

    let mut statuses = [a.status, b.status];
    statuses.sort();
    assert_eq!(statuses, [201, 409]);
    let writer = app.user_row(u1.user_id).await;
    assert_eq!(writer.score, 5);
    assert_eq!(writer.review_count, 1);
}
