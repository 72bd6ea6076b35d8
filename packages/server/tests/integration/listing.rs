use serde_json::{Value, json};

use crate::common::{TestApp, png, routes};

fn ids(body: &Value) -> Vec<i64> {
    body["data"]
        .as_array()
        .expect("data should be an array")
        .iter()
        .map(|a| a["id"].as_i64().unwrap())
        .collect()
}

mod sales {
    use super::*;

    #[tokio::test]
    async fn latest_first_with_pagination() {
        let app = TestApp::spawn().await;
        let writer = app.sign_in("writer").await;
        let a = app.create_article(&writer.access, "A", 100, vec![]).await as i64;
        let b = app.create_article(&writer.access, "B", 300, vec![]).await as i64;
        let c = app.create_article(&writer.access, "C", 200, vec![]).await as i64;

        let page1 = app
            .get_without_token(&format!("{}?perPage=2", routes::user_sales(writer.user_id)))
            .await;
        assert_eq!(page1.status, 200, "{}", page1.text);
        assert_eq!(ids(&page1.body), vec![c, b]);
        assert_eq!(page1.body["pagination"]["total"], 3);
        assert_eq!(page1.body["pagination"]["totalPages"], 2);
        assert_eq!(page1.body["pagination"]["perPage"], 2);

        let page2 = app
            .get_without_token(&format!(
                "{}?page=2&perPage=2",
                routes::user_sales(writer.user_id)
            ))
            .await;
        assert_eq!(ids(&page2.body), vec![a]);
    }

    #[tokio::test]
    async fn price_sorts() {
        let app = TestApp::spawn().await;
        let writer = app.sign_in("writer").await;
        let a = app.create_article(&writer.access, "A", 100, vec![]).await as i64;
        let b = app.create_article(&writer.access, "B", 300, vec![]).await as i64;
        let c = app.create_article(&writer.access, "C", 200, vec![]).await as i64;

        let high = app
            .get_without_token(&format!(
                "{}?sort=high-price",
                routes::user_sales(writer.user_id)
            ))
            .await;
        assert_eq!(ids(&high.body), vec![b, c, a]);

        let low = app
            .get_without_token(&format!(
                "{}?sort=low-price",
                routes::user_sales(writer.user_id)
            ))
            .await;
        assert_eq!(ids(&low.body), vec![a, c, b]);
    }

    #[tokio::test]
    async fn status_filter() {
        let app = TestApp::spawn().await;
        let writer = app.sign_in("writer").await;
        let buyer = app.sign_in("buyer").await;
        let sold = app.create_article(&writer.access, "Sold", 100, vec![]).await;
        let open = app.create_article(&writer.access, "Open", 100, vec![]).await as i64;
        app.complete_trade(sold, &writer, &buyer).await;

        let on_sale = app
            .get_with_token(&format!("{}?status=SALE", routes::MY_SALES), &writer.access)
            .await;
        assert_eq!(on_sale.status, 200, "{}", on_sale.text);
        assert_eq!(ids(&on_sale.body), vec![open]);

        let complete = app
            .get_without_token(&format!(
                "{}?status=complete",
                routes::user_sales(writer.user_id)
            ))
            .await;
        assert_eq!(ids(&complete.body), vec![sold as i64]);
        assert_eq!(complete.body["data"][0]["tradeStatus"], "COMPLETE");
    }

    #[tokio::test]
    async fn huge_page_number_returns_an_empty_page() {
        let app = TestApp::spawn().await;
        let writer = app.sign_in("writer").await;
        app.create_article(&writer.access, "A", 100, vec![]).await;

        let res = app
            .get_without_token(&format!(
                "{}?page={}&perPage=100",
                routes::user_sales(writer.user_id),
                u64::MAX
            ))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(ids(&res.body).is_empty());
        assert_eq!(res.body["pagination"]["total"], 1);
    }

    #[tokio::test]
    async fn unknown_status_is_rejected() {
        let app = TestApp::spawn().await;
        let writer = app.sign_in("writer").await;

        let res = app
            .get_without_token(&format!("{}?status=SOLD", routes::user_sales(writer.user_id)))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(&routes::user_sales(999)).await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn summaries_carry_thumbnail_and_like_state() {
        let app = TestApp::spawn().await;
        let writer = app.sign_in("writer").await;
        let fan = app.sign_in("fan").await;
        let id = app
            .create_article(&writer.access, "Bike", 100, vec![png("first"), png("second")])
            .await;
        let detail = app.get_without_token(&routes::article(id)).await;
        let first_url = detail.body["imageUrls"][0].clone();
        app.post_empty_with_token(&routes::like(id), &fan.access)
            .await;

        let anonymous = app
            .get_without_token(&routes::user_sales(writer.user_id))
            .await;
        let item = &anonymous.body["data"][0];
        assert_eq!(item["thumbnailUrl"], first_url);
        assert!(item["isLiked"].is_null());
        assert!(item["timeAgo"].is_string());

        let as_fan = app
            .get_with_token(&routes::user_sales(writer.user_id), &fan.access)
            .await;
        assert_eq!(as_fan.body["data"][0]["isLiked"], true);
    }
}

mod personal {
    use super::*;

    #[tokio::test]
    async fn likes_offers_and_buys() {
        let app = TestApp::spawn().await;
        let writer = app.sign_in("writer").await;
        let buyer = app.sign_in("buyer").await;
        let liked = app.create_article(&writer.access, "Liked", 100, vec![]).await as i64;
        let offered = app.create_article(&writer.access, "Offered", 100, vec![]).await;
        let bought = app.create_article(&writer.access, "Bought", 100, vec![]).await;

        app.post_empty_with_token(&routes::like(liked as i32), &buyer.access)
            .await;
        app.place_offer(offered, &buyer.access, 50).await;
        app.complete_trade(bought, &writer, &buyer).await;

        let likes = app.get_with_token(routes::MY_LIKES, &buyer.access).await;
        assert_eq!(likes.status, 200, "{}", likes.text);
        assert_eq!(ids(&likes.body), vec![liked]);
        assert_eq!(likes.body["data"][0]["isLiked"], true);

        let offers = app.get_with_token(routes::MY_OFFERS, &buyer.access).await;
        assert_eq!(ids(&offers.body), vec![bought as i64, offered as i64]);

        let buys = app.get_with_token(routes::MY_BUYS, &buyer.access).await;
        assert_eq!(ids(&buys.body), vec![bought as i64]);
        assert_eq!(buys.body["data"][0]["isReviewed"], false);

        let res = app
            .post_with_token(
                routes::REVIEWS,
                &json!({ "articleId": bought, "score": 5 }),
                &buyer.access,
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);

        let buys = app.get_with_token(routes::MY_BUYS, &buyer.access).await;
        assert_eq!(buys.body["data"][0]["isReviewed"], true);
    }

    #[tokio::test]
    async fn personal_listings_require_sign_in() {
        let app = TestApp::spawn().await;

        for path in [routes::MY_SALES, routes::MY_LIKES, routes::MY_OFFERS, routes::MY_BUYS] {
            let res = app.get_without_token(path).await;
            assert_eq!(res.status, 401, "{path}");
        }
    }
}

mod profile {
    use super::*;

    #[tokio::test]
    async fn counters_reflect_activity() {
        let app = TestApp::spawn().await;
        let writer = app.sign_in("writer").await;
        let buyer = app.sign_in("buyer").await;
        let a = app.create_article(&writer.access, "A", 100, vec![]).await;
        let b = app.create_article(&writer.access, "B", 100, vec![]).await;
        app.post_empty_with_token(&routes::like(a), &buyer.access)
            .await;
        app.place_offer(a, &buyer.access, 90).await;
        app.complete_trade(b, &writer, &buyer).await;
        let res = app
            .post_with_token(
                routes::REVIEWS,
                &json!({ "articleId": b, "score": 5 }),
                &writer.access,
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);

        let me = app.get_with_token(routes::ME, &buyer.access).await;
        assert_eq!(me.status, 200, "{}", me.text);
        assert_eq!(me.body["saleCount"], 0);
        assert_eq!(me.body["likeCount"], 1);
        assert_eq!(me.body["offerCount"], 2);
        assert_eq!(me.body["buyCount"], 1);
        assert_eq!(me.body["reviewCount"], 1);
        assert_eq!(me.body["score"], 5);

        let w = app.get_without_token(&routes::user(writer.user_id)).await;
        assert_eq!(w.body["saleCount"], 2);
        assert_eq!(w.body["reviewCount"], 1);
    }

    #[tokio::test]
    async fn email_is_only_shown_to_its_owner() {
        let app = TestApp::spawn().await;
        let alice = app.sign_in("alice").await;
        let bob = app.sign_in("bob").await;

        let own = app.get_with_token(&routes::user(alice.user_id), &alice.access).await;
        assert_eq!(own.body["email"], "alice@example.com");

        let other = app.get_with_token(&routes::user(alice.user_id), &bob.access).await;
        assert!(other.body["email"].is_null());

        let anonymous = app.get_without_token(&routes::user(alice.user_id)).await;
        assert!(anonymous.body["email"].is_null());
    }

    #[tokio::test]
    async fn unknown_profile_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(&routes::user(12345)).await;

        assert_eq!(res.status, 404);
    }
}
