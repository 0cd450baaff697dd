//! Integration tests for the Piwik PRO bridge.

use piwik_pro::{
    CommonEventOptions, EcommerceItem, EcommerceOptions, EcommerceProduct, Error, EventOptions,
    InMemoryTracker, NativeError, PiwikPro, ProfileAttribute, SessionHash,
    TrackEcommerceOptions, TrackEcommerceOrderOptions, TrackGoalOptions, TrackImpressionOptions,
    TrackInteractionOptions, TrackScreenOptions, TrackSocialInteractionOptions, ValidationError,
};
use serde_json::{json, Value};
use std::sync::Arc;

async fn setup() -> (PiwikPro, Arc<InMemoryTracker>) {
    let tracker = Arc::new(InMemoryTracker::new());
    let piwik = PiwikPro::new(tracker.clone());
    piwik
        .init("https://example.com", "1111-2222-3333-dddd")
        .await
        .unwrap();
    (piwik, tracker)
}

#[tokio::test]
async fn test_init_forwards_arguments() {
    let (_, tracker) = setup().await;

    let calls = tracker.calls_to("init").await;

    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].args,
        vec![json!("https://example.com"), json!("1111-2222-3333-dddd")]
    );
}

#[tokio::test]
async fn test_second_init_rejected_by_native() {
    let (piwik, tracker) = setup().await;

    let result = piwik.init("https://example.com", "1111-2222-3333-dddd").await;

    assert!(matches!(
        result,
        Err(Error::Native(NativeError::AlreadyInitialized))
    ));
    assert_eq!(
        result.unwrap_err().to_string(),
        "Piwik Pro SDK has been already initialized"
    );
    // Not validated locally: the native tracker saw both calls.
    assert_eq!(tracker.calls_to("init").await.len(), 2);
}

#[tokio::test]
async fn test_tracking_before_init_rejected() {
    let tracker = Arc::new(InMemoryTracker::new());
    let piwik = PiwikPro::new(tracker.clone());

    let result = piwik.track_screen("example/path", None).await;

    assert!(matches!(result, Err(Error::Native(NativeError::NotInitialized))));
}

#[tokio::test]
async fn test_track_screen_with_options() {
    let (piwik, tracker) = setup().await;
    let options = TrackScreenOptions::default()
        .title("newAction")
        .custom_dimension(1, "pizza");

    piwik
        .track_screen("example/path", Some(options.clone()))
        .await
        .unwrap();

    let calls = tracker.calls_to("trackScreen").await;
    assert_eq!(
        calls[0].args,
        vec![json!("example/path"), serde_json::to_value(&options).unwrap()]
    );
}

#[tokio::test]
async fn test_track_screen_without_options_forwards_null() {
    let (piwik, tracker) = setup().await;

    piwik.track_screen("example/path", None).await.unwrap();

    let calls = tracker.calls_to("trackScreen").await;
    assert_eq!(calls[0].args, vec![json!("example/path"), Value::Null]);
}

#[tokio::test]
async fn test_invalid_dimension_key_makes_no_native_call() {
    let (piwik, tracker) = setup().await;
    let options = TrackScreenOptions::default().custom_dimension(1.2, "blue");

    let result = piwik.track_screen("example/path", Some(options)).await;

    assert!(matches!(
        result,
        Err(Error::Validation(ValidationError::KeyNotAnInteger))
    ));
    assert!(tracker.calls_to("trackScreen").await.is_empty());
    assert!(tracker.pending_hits().await.is_empty());
}

#[tokio::test]
async fn test_invalid_screen_variable_key_makes_no_native_call() {
    let (piwik, tracker) = setup().await;
    let options = TrackScreenOptions::default().screen_custom_variable(0, "food", "pizza");

    let result = piwik.track_screen("example/path", Some(options)).await;

    assert_eq!(
        result.unwrap_err().to_string(),
        "ID (key) must be an integer greater than 0"
    );
    assert!(tracker.calls_to("trackScreen").await.is_empty());
}

#[tokio::test]
async fn test_invalid_visit_variable_key_rejected() {
    let (piwik, tracker) = setup().await;
    let options = CommonEventOptions::default().visit_custom_variable("01", "color", "green");

    let result = piwik.track_exception("boom", Some(options)).await;

    assert!(matches!(
        result,
        Err(Error::Validation(ValidationError::KeyNotAnInteger))
    ));
    assert!(tracker.calls_to("trackException").await.is_empty());
}

#[tokio::test]
async fn test_track_custom_event_forwards_options() {
    let (piwik, tracker) = setup().await;
    let options = piwik_pro::TrackCustomEventOptions::default()
        .name("customEvent")
        .value(1.5)
        .path("some/path")
        .custom_dimension(1, "beta");

    piwik
        .track_custom_event("category", "action", Some(options))
        .await
        .unwrap();

    let calls = tracker.calls_to("trackCustomEvent").await;
    assert_eq!(
        calls[0].args,
        vec![
            json!("category"),
            json!("action"),
            json!({
                "customDimensions": { "1": "beta" },
                "name": "customEvent",
                "value": 1.5,
                "path": "some/path"
            })
        ]
    );
}

fn common_options() -> CommonEventOptions {
    CommonEventOptions::default()
        .custom_dimension(1, "beta")
        .visit_custom_variable(4, "food", "pizza")
}

fn product() -> EcommerceProduct {
    EcommerceProduct::new("craft-311")
        .name("Unicorn Iron on Patch")
        .category(["Crafts & Sewing", "Toys"])
        .price("49.9089")
        .quantity(3)
        .custom_dimension(1, "coupon-2020")
}

#[tokio::test]
async fn test_track_social_interaction() {
    let (piwik, tracker) = setup().await;
    let options = TrackSocialInteractionOptions {
        common: common_options(),
    };

    piwik
        .track_social_interaction("sample exception", "facebook", Some(options.clone()))
        .await
        .unwrap();
    piwik
        .track_social_interaction("sample exception", "facebook", None)
        .await
        .unwrap();

    let calls = tracker.calls_to("trackSocialInteraction").await;
    assert_eq!(
        calls[0].args,
        vec![
            json!("sample exception"),
            json!("facebook"),
            json!({
                "customDimensions": { "1": "beta" },
                "visitCustomVariables": { "4": { "name": "food", "value": "pizza" } }
            })
        ]
    );
    assert_eq!(
        calls[1].args,
        vec![json!("sample exception"), json!("facebook"), Value::Null]
    );
}

#[tokio::test]
async fn test_track_impression() {
    let (piwik, tracker) = setup().await;
    let options = TrackImpressionOptions {
        common: common_options(),
        piece: Some("banner".into()),
        target: Some("https://www.dn.se/".into()),
    };

    piwik
        .track_impression("Some content impression", Some(options))
        .await
        .unwrap();
    piwik
        .track_impression("Some content impression", None)
        .await
        .unwrap();

    let calls = tracker.calls_to("trackImpression").await;
    assert_eq!(calls[0].args[0], json!("Some content impression"));
    assert_eq!(calls[0].args[1]["piece"], "banner");
    assert_eq!(calls[0].args[1]["target"], "https://www.dn.se/");
    assert_eq!(calls[0].args[1]["customDimensions"]["1"], "beta");
    assert_eq!(
        calls[1].args,
        vec![json!("Some content impression"), Value::Null]
    );
}

#[tokio::test]
async fn test_track_interaction() {
    let (piwik, tracker) = setup().await;
    let options = TrackInteractionOptions {
        common: common_options(),
        piece: Some("banner".into()),
        target: Some("https://www.dn.se/".into()),
    };

    piwik
        .track_interaction("Some content interaction", "click", Some(options.clone()))
        .await
        .unwrap();

    let calls = tracker.calls_to("trackInteraction").await;
    assert_eq!(
        calls[0].args,
        vec![
            json!("Some content interaction"),
            json!("click"),
            serde_json::to_value(&options).unwrap()
        ]
    );
    let hits = tracker.pending_hits().await;
    assert_eq!(hits[0].subject, vec!["Some content interaction", "click"]);
    assert_eq!(hits[0].param_value("piece"), Some("banner"));
}

#[tokio::test]
async fn test_track_legacy_ecommerce() {
    let (piwik, tracker) = setup().await;
    let options = TrackEcommerceOptions {
        common: common_options(),
        discount: Some(0),
        shipping: Some(222),
        sub_total: Some(500),
        tax: Some(20),
        items: Some(vec![EcommerceItem {
            sku: "0123456789012".into(),
            name: "Polo T-shirt".into(),
            category: "Men's T-shirts".into(),
            price: 3000,
            quantity: 2,
        }]),
    };

    piwik
        .track_ecommerce("transaction", 650, Some(options.clone()))
        .await
        .unwrap();

    let calls = tracker.calls_to("trackEcommerce").await;
    assert_eq!(
        calls[0].args,
        vec![
            json!("transaction"),
            json!(650),
            serde_json::to_value(&options).unwrap()
        ]
    );
    let hits = tracker.pending_hits().await;
    assert_eq!(hits[0].subject, vec!["transaction", "650"]);
    assert_eq!(hits[0].products[0].sku, "0123456789012");
    assert_eq!(hits[0].param_value("shipping"), Some("222"));
}

#[tokio::test]
async fn test_product_detail_view_with_currency_code() {
    let (piwik, tracker) = setup().await;
    let options = EcommerceOptions {
        common: common_options(),
        currency_code: Some("EUR".into()),
    };

    piwik
        .track_ecommerce_product_detail_view(vec![product()], Some(options))
        .await
        .unwrap();

    let calls = tracker.calls_to("trackEcommerceProductDetailView").await;
    assert_eq!(calls[0].args[0], json!([serde_json::to_value(product()).unwrap()]));
    assert_eq!(calls[0].args[1]["currencyCode"], "EUR");
    assert_eq!(
        tracker.pending_hits().await[0].param_value("currencyCode"),
        Some("EUR")
    );
}

#[tokio::test]
async fn test_remove_from_cart_with_and_without_options() {
    let (piwik, tracker) = setup().await;
    let options = EcommerceOptions {
        common: common_options(),
        currency_code: None,
    };

    piwik
        .track_ecommerce_remove_from_cart(vec![product()], Some(options.clone()))
        .await
        .unwrap();
    piwik
        .track_ecommerce_remove_from_cart(vec![product()], None)
        .await
        .unwrap();

    let calls = tracker.calls_to("trackEcommerceRemoveFromCart").await;
    assert_eq!(calls[0].args[1], serde_json::to_value(&options).unwrap());
    assert!(calls[0].args[1].get("currencyCode").is_none());
    assert_eq!(calls[1].args[1], Value::Null);
}

#[tokio::test]
async fn test_order_with_invalid_product_key_makes_no_native_call() {
    let (piwik, tracker) = setup().await;
    let bad = product().custom_dimension(0, "free");

    let result = piwik
        .track_ecommerce_order("transaction", "650", vec![product(), bad], None)
        .await;

    assert!(matches!(
        result,
        Err(Error::Validation(ValidationError::KeyNotPositive))
    ));
    assert!(tracker.calls_to("trackEcommerceOrder").await.is_empty());
}

#[tokio::test]
async fn test_order_with_invalid_options_key_makes_no_native_call() {
    let (piwik, tracker) = setup().await;
    let options = TrackEcommerceOrderOptions {
        currency_code: Some("EUR".into()),
        ..Default::default()
    }
    .visit_custom_variable(1.5, "color", "green");

    let result = piwik
        .track_ecommerce_order("transaction", "650", vec![product()], Some(options))
        .await;

    assert!(matches!(
        result,
        Err(Error::Validation(ValidationError::KeyNotAnInteger))
    ));
    assert!(tracker.calls_to("trackEcommerceOrder").await.is_empty());
}

#[tokio::test]
async fn test_track_goal_with_currency_code() {
    let (piwik, tracker) = setup().await;
    let goal = "27ecc5e3-8ae0-40c3-964b-5bd8ee3da059";

    piwik
        .track_goal(
            goal,
            Some(TrackGoalOptions::default().revenue(3.0).currency_code("USD")),
        )
        .await
        .unwrap();

    let hits = tracker.pending_hits().await;
    assert_eq!(hits[0].kind, "goal");
    assert_eq!(hits[0].subject, vec![goal]);
    assert_eq!(hits[0].param_value("currencyCode"), Some("USD"));
    assert_eq!(hits[0].param_value("revenue"), Some("3"));
}

#[tokio::test]
async fn test_ecommerce_order_forwards_products() {
    let (piwik, tracker) = setup().await;
    let products = vec![EcommerceProduct::new("craft-311")
        .name("Unicorn Iron on Patch")
        .category(["Crafts & Sewing", "Toys"])
        .price("49.9089")
        .quantity(3)
        .custom_dimension(1, "coupon-2020")];

    piwik
        .track_ecommerce_order("transaction", "650", products.clone(), None)
        .await
        .unwrap();

    let calls = tracker.calls_to("trackEcommerceOrder").await;
    assert_eq!(calls[0].args[0], json!("transaction"));
    assert_eq!(calls[0].args[1], json!("650"));
    assert_eq!(calls[0].args[2], serde_json::to_value(&products).unwrap());
    assert_eq!(calls[0].args[3], Value::Null);

    let hits = tracker.pending_hits().await;
    assert_eq!(hits[0].products[0].sku, "craft-311");
    assert_eq!(hits[0].products[0].dimensions[0].value, "coupon-2020");
}

#[tokio::test]
async fn test_product_with_too_many_dimensions_rejected() {
    let (piwik, tracker) = setup().await;
    let product = (1..=21).fold(EcommerceProduct::new("craft-311"), |p, id| {
        p.custom_dimension(id, "20%")
    });

    let result = piwik
        .track_ecommerce_add_to_cart(vec![product], None)
        .await;

    assert_eq!(
        result.unwrap_err().to_string(),
        "Max 20 product custom dimensions, 20 is max ID."
    );
    assert!(tracker.calls_to("trackEcommerceAddToCart").await.is_empty());
}

#[tokio::test]
async fn test_cart_update_forwards_grand_total() {
    let (piwik, tracker) = setup().await;

    piwik
        .track_ecommerce_cart_update(vec![EcommerceProduct::new("sku-1")], "5000.00", None)
        .await
        .unwrap();

    let calls = tracker.calls_to("trackEcommerceCartUpdate").await;
    assert_eq!(calls[0].args[1], json!("5000.00"));
    assert_eq!(calls[0].args[2], Value::Null);
}

#[tokio::test]
async fn test_profile_attribute_single_normalized_to_list() {
    let (piwik, tracker) = setup().await;

    piwik
        .track_profile_attributes(ProfileAttribute::new("food", "pizza"))
        .await
        .unwrap();

    let calls = tracker.calls_to("trackProfileAttributes").await;
    assert_eq!(
        calls[0].args,
        vec![json!([{ "name": "food", "value": "pizza" }])]
    );
}

#[tokio::test]
async fn test_profile_attribute_list_forwarded() {
    let (piwik, tracker) = setup().await;

    piwik
        .track_profile_attributes(vec![
            ProfileAttribute::new("food", "pizza"),
            ProfileAttribute::new("color", "green"),
        ])
        .await
        .unwrap();

    let calls = tracker.calls_to("trackProfileAttributes").await;
    assert_eq!(calls[0].args[0].as_array().map(Vec::len), Some(2));
    let attrs = piwik.get_profile_attributes().await.unwrap();
    assert_eq!(attrs.get("color").map(String::as_str), Some("green"));
}

#[tokio::test]
async fn test_empty_profile_attributes_rejected() {
    let (piwik, tracker) = setup().await;

    let result = piwik.track_profile_attributes(Vec::new()).await;

    assert_eq!(
        result.unwrap_err().to_string(),
        "Profile attributes cannot be an empty array"
    );
    assert!(tracker.calls_to("trackProfileAttributes").await.is_empty());
}

#[tokio::test]
async fn test_set_dispatch_interval_integer() {
    let (piwik, tracker) = setup().await;

    piwik.set_dispatch_interval(5).await.unwrap();

    let calls = tracker.calls_to("setDispatchInterval").await;
    assert_eq!(calls[0].args, vec![json!(5)]);
    assert_eq!(piwik.get_dispatch_interval().await.unwrap(), 5);
}

#[tokio::test]
async fn test_dispatch_interval_accepts_value_read_back() {
    let (piwik, tracker) = setup().await;

    let interval: i64 = piwik.get_dispatch_interval().await.unwrap();
    piwik.set_dispatch_interval(interval).await.unwrap();
    piwik.set_session_timeout(600u32).await.unwrap();

    let calls = tracker.calls_to("setDispatchInterval").await;
    assert_eq!(calls[0].args, vec![json!(interval)]);
    assert_eq!(piwik.get_session_timeout().await.unwrap(), 600);
}

#[tokio::test]
async fn test_set_dispatch_interval_float_rejected() {
    let (piwik, tracker) = setup().await;

    let result = piwik.set_dispatch_interval(5.1).await;

    assert_eq!(
        result.unwrap_err().to_string(),
        "Parameter must be an integer number"
    );
    assert!(tracker.calls_to("setDispatchInterval").await.is_empty());
}

#[tokio::test]
async fn test_set_visitor_id_lifetime_validated() {
    let (piwik, tracker) = setup().await;

    piwik.set_visitor_id_lifetime(5).await.unwrap();
    let result = piwik.set_visitor_id_lifetime(5.1).await;

    assert!(matches!(
        result,
        Err(Error::Validation(ValidationError::NotAnInteger))
    ));
    assert_eq!(tracker.calls_to("setVisitorIDLifetime").await.len(), 1);
    assert_eq!(tracker.visitor_id_lifetime().await, 5);
}

#[tokio::test]
async fn test_set_session_timeout_validated() {
    let (piwik, tracker) = setup().await;

    piwik.set_session_timeout(1200).await.unwrap();
    assert!(piwik.set_session_timeout(0.5).await.is_err());

    assert_eq!(piwik.get_session_timeout().await.unwrap(), 1200);
    assert_eq!(tracker.calls_to("setSessionTimeout").await.len(), 1);
}

#[tokio::test]
async fn test_set_visitor_id_validated() {
    let (piwik, tracker) = setup().await;

    piwik.set_visitor_id("41c90f410ed00000").await.unwrap();
    let result = piwik.set_visitor_id("41c90f410ed000zs").await;

    assert_eq!(
        result.unwrap_err().to_string(),
        "Visitor ID 41c90f410ed000zs has invalid format. The format must match the regular expression: ^[0-9a-f]{16}$"
    );
    assert_eq!(tracker.calls_to("setVisitorId").await.len(), 1);
    assert_eq!(piwik.get_visitor_id().await.unwrap(), "41c90f410ed00000");
}

#[tokio::test]
async fn test_visitor_id_from_deep_link() {
    let (piwik, _) = setup().await;

    assert!(piwik
        .set_visitor_id_from_deep_link("https://example.com?pk_vid=41c90f410ed00000")
        .await
        .unwrap());
    assert!(!piwik
        .set_visitor_id_from_deep_link("https://example.com")
        .await
        .unwrap());
    assert!(piwik
        .set_visitor_id_from_deep_link("https://example.com?pk_vid=123456789")
        .await
        .is_err());
}

#[tokio::test]
async fn test_native_rejection_surfaces_unchanged() {
    let (piwik, tracker) = setup().await;
    let error = NativeError::Failed("Failed to set visitor ID".into());
    tracker.reject_next(error.clone()).await;

    let result = piwik
        .set_visitor_id_from_deep_link("https://example.com?pk_vid=123456789")
        .await;

    match result {
        Err(Error::Native(e)) => assert_eq!(e, error),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_user_agent() {
    let tracker = Arc::new(
        InMemoryTracker::new().with_user_agent("Mozilla/5.0 (React Native) PiwikPro/1.0.0"),
    );
    let piwik = PiwikPro::new(tracker.clone());

    assert_eq!(
        piwik.get_user_agent().await.unwrap(),
        "Mozilla/5.0 (React Native) PiwikPro/1.0.0"
    );

    tracker
        .reject_next(NativeError::Failed("Failed to get user agent".into()))
        .await;
    assert_eq!(
        piwik.get_user_agent().await.unwrap_err().to_string(),
        "Failed to get user agent"
    );
}

#[tokio::test]
async fn test_session_hash_round_trip() {
    let (piwik, tracker) = setup().await;

    for hash in [SessionHash::Disabled, SessionHash::Enabled, SessionHash::NotSet] {
        piwik.set_session_hash(hash).await.unwrap();
        assert_eq!(piwik.get_session_hash().await.unwrap(), hash);
    }

    let calls = tracker.calls_to("setSessionHash").await;
    let args: Vec<Value> = calls.into_iter().map(|c| c.args[0].clone()).collect();
    assert_eq!(args, vec![json!(0), json!(1), json!(2)]);
}

#[tokio::test]
async fn test_session_hash_failure_surfaces() {
    let (piwik, tracker) = setup().await;
    tracker
        .reject_next(NativeError::Failed("Failed to set session hash".into()))
        .await;

    let result = piwik.set_session_hash(SessionHash::Enabled).await;

    assert_eq!(result.unwrap_err().to_string(), "Failed to set session hash");
    assert_eq!(tracker.calls_to("setSessionHash").await.len(), 1);
}

#[tokio::test]
async fn test_identity_round_trip() {
    let (piwik, _) = setup().await;

    piwik.set_user_id("user-42").await.unwrap();
    piwik.set_user_email("john@example.com").await.unwrap();

    assert_eq!(piwik.get_user_id().await.unwrap(), "user-42");
    assert_eq!(piwik.get_user_email().await.unwrap(), "john@example.com");
}

#[tokio::test]
async fn test_privacy_flags_round_trip() {
    let (piwik, _) = setup().await;

    piwik.set_include_default_custom_variables(false).await.unwrap();
    piwik.set_anonymization_state(false).await.unwrap();
    piwik.set_opt_out(true).await.unwrap();
    piwik.set_dry_run(true).await.unwrap();
    piwik.set_prefixing(false).await.unwrap();

    assert!(!piwik.get_include_default_custom_variables().await.unwrap());
    assert!(!piwik.is_anonymization_on().await.unwrap());
    assert!(piwik.get_opt_out().await.unwrap());
    assert!(piwik.get_dry_run().await.unwrap());
    assert!(!piwik.is_prefixing_on().await.unwrap());
}

#[tokio::test]
async fn test_dispatch_sends_queued_hits() {
    let (piwik, tracker) = setup().await;

    piwik.track_download("https://example.com/a.zip", None).await.unwrap();
    piwik.track_outlink("https://other.example.com", None).await.unwrap();
    piwik.track_campaign("http://example.org/offer.html?pk_campaign=Email-SummerDeals").await.unwrap();
    assert_eq!(tracker.pending_hits().await.len(), 3);

    piwik.dispatch().await.unwrap();

    assert!(tracker.pending_hits().await.is_empty());
    let kinds: Vec<&str> = tracker
        .dispatched_hits()
        .await
        .iter()
        .map(|h| h.kind)
        .collect();
    assert_eq!(kinds, vec!["download", "outlink", "campaign"]);
}

#[tokio::test]
async fn test_start_new_session() {
    let (piwik, tracker) = setup().await;

    piwik.start_new_session().await.unwrap();

    assert_eq!(tracker.session_count().await, 2);
}

#[tokio::test]
async fn test_audience_membership() {
    let tracker = Arc::new(InMemoryTracker::new().with_audience("audience-1"));
    let piwik = PiwikPro::new(tracker.clone());
    piwik.init("https://example.com", "site").await.unwrap();

    assert!(piwik.check_audience_membership("audience-1").await.unwrap());
    assert!(!piwik.check_audience_membership("audience-2").await.unwrap());

    let calls = tracker.calls_to("checkAudienceMembership").await;
    assert_eq!(calls[0].args, vec![json!("audience-1")]);
}

#[tokio::test]
async fn test_configure_applies_settings() {
    let tracker = Arc::new(InMemoryTracker::new());
    let piwik = PiwikPro::new(tracker.clone());
    let config = PiwikPro::builder("https://example.com", "site-1")
        .dispatch_interval(10)
        .session_timeout(600)
        .dry_run(true)
        .session_hash(SessionHash::Disabled)
        .build()
        .unwrap();

    piwik.configure(&config).await.unwrap();

    assert!(tracker.is_initialized().await);
    assert_eq!(piwik.get_dispatch_interval().await.unwrap(), 10);
    assert_eq!(piwik.get_session_timeout().await.unwrap(), 600);
    assert!(piwik.get_dry_run().await.unwrap());
    assert_eq!(piwik.get_session_hash().await.unwrap(), SessionHash::Disabled);
    // Unset settings are not forwarded.
    assert!(tracker.calls_to("setOptOut").await.is_empty());
}

#[tokio::test]
async fn test_configure_stops_at_first_failure() {
    let (piwik, tracker) = setup().await;
    let config = PiwikPro::builder("https://example.com", "site-1")
        .dispatch_interval(10)
        .build()
        .unwrap();

    let result = piwik.configure(&config).await;

    assert!(matches!(
        result,
        Err(Error::Native(NativeError::AlreadyInitialized))
    ));
    assert!(tracker.calls_to("setDispatchInterval").await.is_empty());
}

#[tokio::test]
async fn test_concurrent_calls_are_independent() {
    let (piwik, tracker) = setup().await;
    let mut handles = vec![];

    for i in 0..50 {
        let piwik = piwik.clone();
        handles.push(tokio::spawn(async move {
            piwik.track_screen(format!("screen/{i}"), None).await
        }));
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(tracker.pending_hits().await.len(), 50);
}
