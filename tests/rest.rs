#![allow(
    clippy::unwrap_used,
    reason = "Do not need additional syntax for setting up tests"
)]

mod common;

use gdax_client_sdk::error::{HttpErrorKind, Kind};
use gdax_client_sdk::rest::types::request::{
    CancelAllRequest, FillsRequest, HistoricRatesRequest, LimitOrder, MarketOrder,
    OrderBookRequest, OrdersRequest, PlaceOrderRequest,
};
use gdax_client_sdk::rest::types::response::BookOrders;
use gdax_client_sdk::rest::types::{BookLevel, Liquidity, OrderStatus, Side};
use gdax_client_sdk::rest::{Client, Config};
use gdax_client_sdk::types::{DateTime, Uuid, dec};
use httpmock::MockServer;
use reqwest::StatusCode;
use serde_json::json;

use crate::common::{
    CB_ACCESS_SIGN, CB_ACCESS_TIMESTAMP, SERVER_EPOCH, create_authenticated, expected_signature,
    mock_server_time,
};

const ORDER_ID: &str = "d0c5340b-6d6c-49d9-b567-48c4bfca13d2";
const ACCOUNT_ID: &str = "e316cb9a-0808-4fd7-8914-97829c1925de";
const PROFILE_ID: &str = "75da88c5-05bf-4f54-bc85-5c775bd68254";

mod status {
    use super::*;

    async fn status_error(status: u16, body: &str) -> anyhow::Result<gdax_client_sdk::error::Error> {
        let server = MockServer::start();
        let client = Client::new(&server.base_url(), Config::default())?;

        let mock = server.mock(|when, then| {
            when.method(httpmock::Method::GET).path("/products");
            then.status(status).body(body);
        });

        let err = client.products().await.unwrap_err();
        mock.assert();

        Ok(err)
    }

    #[tokio::test]
    async fn known_codes_map_to_their_kind() -> anyhow::Result<()> {
        for (code, expected) in [
            (400, HttpErrorKind::BadRequest),
            (401, HttpErrorKind::Unauthorized),
            (403, HttpErrorKind::Forbidden),
            (404, HttpErrorKind::NotFound),
            (500, HttpErrorKind::InternalServerError),
        ] {
            let body = format!(r#"{{"message":"failed with {code}"}}"#);
            let err = status_error(code, &body).await?;

            assert_eq!(err.kind(), Kind::Status);
            let status = err.http_status().unwrap();
            assert_eq!(status.http_error_kind(), expected, "{code}");
            assert_eq!(status.status_code.as_u16(), code);
            assert_eq!(status.body, body);
            assert_eq!(status.path, "/products");
        }

        Ok(())
    }

    #[tokio::test]
    async fn other_codes_keep_code_and_body() -> anyhow::Result<()> {
        let err = status_error(418, "I'm a teapot").await?;

        let status = err.http_status().unwrap();
        assert_eq!(status.http_error_kind(), HttpErrorKind::Other);
        assert_eq!(status.status_code, StatusCode::IM_A_TEAPOT);
        assert_eq!(status.body, "I'm a teapot");

        Ok(())
    }

    #[tokio::test]
    async fn non_200_success_codes_are_errors() -> anyhow::Result<()> {
        let err = status_error(201, "{}").await?;

        assert_eq!(err.kind(), Kind::Status);
        assert_eq!(err.http_status().unwrap().http_error_kind(), HttpErrorKind::Other);

        Ok(())
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() -> anyhow::Result<()> {
        let client = Client::new("http://127.0.0.1:1", Config::default())?;

        let err = client.products().await.unwrap_err();

        assert_eq!(err.kind(), Kind::Transport);
        assert!(err.http_status().is_none());

        Ok(())
    }
}

mod transport {
    use super::*;

    #[tokio::test]
    async fn trailing_slash_in_base_is_trimmed() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = Client::new(&format!("{}/", server.base_url()), Config::default())?;

        let mock = server.mock(|when, then| {
            when.method(httpmock::Method::GET).path("/currencies");
            then.status(StatusCode::OK).json_body(json!([]));
        });

        assert!(client.currencies().await?.is_empty());
        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn query_is_signed_with_leading_question_mark() -> anyhow::Result<()> {
        let server = MockServer::start();
        let _time = mock_server_time(&server);
        let client = create_authenticated(&server)?;

        let mock = server.mock(|when, then| {
            when.method(httpmock::Method::GET)
                .path("/orders")
                .query_param("status", "done")
                .query_param("product_id", "BTC-USD")
                .header(CB_ACCESS_TIMESTAMP, SERVER_EPOCH)
                .header(
                    CB_ACCESS_SIGN,
                    expected_signature(&format!(
                        "{SERVER_EPOCH}GET/orders?status=done&product_id=BTC-USD"
                    )),
                );
            then.status(StatusCode::OK).json_body(json!([]));
        });

        let request = OrdersRequest::builder()
            .status(OrderStatus::Done)
            .product_id("BTC-USD")
            .build();
        assert!(client.orders(&request).await?.is_empty());
        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn body_is_transmitted_exactly_as_signed() -> anyhow::Result<()> {
        let server = MockServer::start();
        let _time = mock_server_time(&server);
        let client = create_authenticated(&server)?;

        let order: PlaceOrderRequest = LimitOrder::builder()
            .product_id("BTC-USD")
            .side(Side::Buy)
            .price(dec!(100.00))
            .size(dec!(0.01))
            .build()
            .into();
        let body = serde_json::to_string(&order)?;

        let mock = server.mock(|when, then| {
            when.method(httpmock::Method::POST)
                .path("/orders")
                .body(&body)
                .json_body(json!({
                    "type": "limit",
                    "side": "buy",
                    "product_id": "BTC-USD",
                    "price": "100.00",
                    "size": "0.01"
                }))
                .header(
                    CB_ACCESS_SIGN,
                    expected_signature(&format!("{SERVER_EPOCH}POST/orders{body}")),
                );
            then.status(StatusCode::OK).json_body(json!({
                "id": ORDER_ID,
                "price": "100.00",
                "size": "0.01",
                "product_id": "BTC-USD",
                "side": "buy",
                "stp": "dc",
                "type": "limit",
                "time_in_force": "GTC",
                "post_only": false,
                "created_at": "2016-12-08T20:02:28.53864Z",
                "fill_fees": "0.0000000000000000",
                "filled_size": "0.00000000",
                "executed_value": "0.0000000000000000",
                "status": "pending",
                "settled": false
            }));
        });

        let placed = client.place_order(&order).await?;

        assert_eq!(placed.id, Uuid::parse_str(ORDER_ID)?);
        assert_eq!(placed.status, OrderStatus::Pending);
        assert_eq!(placed.price, Some(dec!(100.00)));
        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn invalid_order_never_reaches_the_exchange() -> anyhow::Result<()> {
        let server = MockServer::start();
        let time = mock_server_time(&server);
        let client = create_authenticated(&server)?;

        let mock = server.mock(|when, then| {
            when.method(httpmock::Method::POST).path("/orders");
            then.status(StatusCode::OK).json_body(json!({}));
        });

        let order: PlaceOrderRequest = MarketOrder::builder()
            .product_id("BTC-USD")
            .side(Side::Sell)
            .build()
            .into();
        let err = client.place_order(&order).await.unwrap_err();

        assert_eq!(err.kind(), Kind::Validation);
        mock.assert_calls(0);
        time.assert_calls(0);

        Ok(())
    }

    #[tokio::test]
    async fn server_time_is_fetched_per_signed_request() -> anyhow::Result<()> {
        let server = MockServer::start();
        let time = mock_server_time(&server);
        let client = create_authenticated(&server)?;

        let mock = server.mock(|when, then| {
            when.method(httpmock::Method::GET)
                .path("/fills")
                .query_param("order_id", ORDER_ID);
            then.status(StatusCode::OK).json_body(json!([]));
        });

        let request = FillsRequest::builder()
            .order_id(Uuid::parse_str(ORDER_ID)?)
            .build();
        client.fills(&request).await?;
        client.fills(&request).await?;

        mock.assert_calls(2);
        time.assert_calls(2);

        Ok(())
    }

    #[tokio::test]
    async fn empty_body_decodes_as_null() -> anyhow::Result<()> {
        let server = MockServer::start();
        let _time = mock_server_time(&server);
        let client = create_authenticated(&server)?;

        let mock = server.mock(|when, then| {
            when.method(httpmock::Method::DELETE).path("/orders");
            then.status(StatusCode::OK).body("");
        });

        let cancelled = client
            .cancel_all_orders(&CancelAllRequest::default())
            .await?;

        assert!(cancelled.order_ids.is_empty());
        mock.assert();

        Ok(())
    }
}

mod public {
    use super::*;

    #[tokio::test]
    async fn products_should_succeed() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = Client::new(&server.base_url(), Config::default())?;

        let mock = server.mock(|when, then| {
            when.method(httpmock::Method::GET).path("/products");
            then.status(StatusCode::OK).json_body(json!([
                {
                    "id": "BTC-USD",
                    "base_currency": "BTC",
                    "quote_currency": "USD",
                    "base_min_size": "0.01",
                    "base_max_size": "10000.00",
                    "quote_increment": "0.01",
                    "display_name": "BTC/USD",
                    "status": "online",
                    "margin_enabled": false,
                    "status_message": null
                }
            ]));
        });

        let products = client.products().await?;

        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, "BTC-USD");
        assert_eq!(products[0].base_min_size, dec!(0.01));
        assert_eq!(products[0].display_name.as_deref(), Some("BTC/USD"));
        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn product_order_book_should_succeed() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = Client::new(&server.base_url(), Config::default())?;

        let mock = server.mock(|when, then| {
            when.method(httpmock::Method::GET)
                .path("/products/BTC-USD/book")
                .query_param("level", "2");
            then.status(StatusCode::OK).json_body(json!({
                "sequence": 3,
                "bids": [["295.96", "4.39088265", 2]],
                "asks": [["295.97", "25.23542881", 12]]
            }));
        });

        let request = OrderBookRequest::builder().level(BookLevel::Top50).build();
        let book = client.product_order_book("BTC-USD", &request).await?;

        assert_eq!(book.sequence, 3);
        assert_eq!(book.bids[0].price, dec!(295.96));
        assert_eq!(book.asks[0].orders, BookOrders::Count(12));
        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn trades_should_succeed() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = Client::new(&server.base_url(), Config::default())?;

        let mock = server.mock(|when, then| {
            when.method(httpmock::Method::GET)
                .path("/products/BTC-USD/trades");
            then.status(StatusCode::OK).json_body(json!([
                {
                    "time": "2014-11-07T22:19:28.578544Z",
                    "trade_id": 74,
                    "price": "10.00000000",
                    "size": "0.01000000",
                    "side": "buy"
                }
            ]));
        });

        let trades = client.trades("BTC-USD").await?;

        assert_eq!(trades[0].trade_id, 74);
        assert_eq!(trades[0].side, Side::Buy);
        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn historic_rates_should_succeed() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = Client::new(&server.base_url(), Config::default())?;

        let mock = server.mock(|when, then| {
            when.method(httpmock::Method::GET)
                .path("/products/BTC-USD/candles")
                .query_param("start", "2018-01-01T00:00:00Z")
                .query_param("granularity", "3600");
            then.status(StatusCode::OK).json_body(json!([
                [1_415_398_768, 0.32, 4.2, 0.35, 4.2, 12.3],
                [1_415_395_168, 0.30, 0.35, 0.30, 0.32, 8.1]
            ]));
        });

        let request = HistoricRatesRequest::builder()
            .start(DateTime::from_timestamp(1_514_764_800, 0).unwrap())
            .granularity(3600)
            .build();
        let candles = client.historic_rates("BTC-USD", &request).await?;

        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].time.timestamp(), 1_415_398_768);
        assert_eq!(candles[0].volume, dec!(12.3));
        assert_eq!(candles[1].close, dec!(0.32));
        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn stats_24h_should_succeed() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = Client::new(&server.base_url(), Config::default())?;

        let mock = server.mock(|when, then| {
            when.method(httpmock::Method::GET)
                .path("/products/BTC-USD/stats");
            then.status(StatusCode::OK).json_body(json!({
                "open": "34.19000000",
                "high": "95.70000000",
                "low": "7.06000000",
                "volume": "2.41000000"
            }));
        });

        let stats = client.stats_24h("BTC-USD").await?;

        assert_eq!(stats.high, dec!(95.70000000));
        assert_eq!(stats.last, None);
        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn server_time_should_succeed() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = Client::new(&server.base_url(), Config::default())?;
        let mock = mock_server_time(&server);

        let time = client.server_time().await?;

        assert_eq!(time.timestamp().to_string(), SERVER_EPOCH);
        mock.assert();

        Ok(())
    }
}

mod private {
    use super::*;

    #[tokio::test]
    async fn account_should_succeed() -> anyhow::Result<()> {
        let server = MockServer::start();
        let _time = mock_server_time(&server);
        let client = create_authenticated(&server)?;

        let mock = server.mock(|when, then| {
            when.method(httpmock::Method::GET)
                .path(format!("/accounts/{ACCOUNT_ID}"));
            then.status(StatusCode::OK).json_body(json!({
                "id": ACCOUNT_ID,
                "currency": "USD",
                "balance": "1.100",
                "available": "1.00",
                "hold": "0.100",
                "profile_id": PROFILE_ID
            }));
        });

        let account = client.account(Uuid::parse_str(ACCOUNT_ID)?).await?;

        assert_eq!(account.currency, "USD");
        assert_eq!(account.hold, dec!(0.100));
        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn account_history_should_succeed() -> anyhow::Result<()> {
        let server = MockServer::start();
        let _time = mock_server_time(&server);
        let client = create_authenticated(&server)?;

        let mock = server.mock(|when, then| {
            when.method(httpmock::Method::GET)
                .path(format!("/accounts/{ACCOUNT_ID}/ledger"));
            then.status(StatusCode::OK).json_body(json!([
                {
                    "id": "100",
                    "created_at": "2014-11-07T08:19:27.028459Z",
                    "amount": "0.001",
                    "balance": "239.669",
                    "type": "fee",
                    "details": {
                        "order_id": ORDER_ID,
                        "trade_id": "74",
                        "product_id": "BTC-USD"
                    }
                }
            ]));
        });

        let history = client
            .account_history(Uuid::parse_str(ACCOUNT_ID)?)
            .await?;

        assert_eq!(history[0].id, 100);
        assert_eq!(
            history[0].details.as_ref().unwrap().product_id.as_deref(),
            Some("BTC-USD")
        );
        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn cancel_order_should_succeed() -> anyhow::Result<()> {
        let server = MockServer::start();
        let _time = mock_server_time(&server);
        let client = create_authenticated(&server)?;

        let mock = server.mock(|when, then| {
            when.method(httpmock::Method::DELETE)
                .path(format!("/orders/{ORDER_ID}"))
                .header(
                    CB_ACCESS_SIGN,
                    expected_signature(&format!("{SERVER_EPOCH}DELETE/orders/{ORDER_ID}")),
                );
            then.status(StatusCode::OK).json_body(json!(ORDER_ID));
        });

        let cancelled = client.cancel_order(Uuid::parse_str(ORDER_ID)?).await?;

        assert_eq!(cancelled.order_ids, vec![Uuid::parse_str(ORDER_ID)?]);
        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn cancel_all_orders_should_succeed() -> anyhow::Result<()> {
        let server = MockServer::start();
        let _time = mock_server_time(&server);
        let client = create_authenticated(&server)?;

        let mock = server.mock(|when, then| {
            when.method(httpmock::Method::DELETE)
                .path("/orders")
                .query_param("product_id", "BTC-USD");
            then.status(StatusCode::OK).json_body(json!([
                ORDER_ID,
                "144c6f8e-713f-4682-8435-5280fbe8b2b4"
            ]));
        });

        let request = CancelAllRequest::builder().product_id("BTC-USD").build();
        let cancelled = client.cancel_all_orders(&request).await?;

        assert_eq!(cancelled.order_ids.len(), 2);
        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn order_and_fills_should_succeed() -> anyhow::Result<()> {
        let server = MockServer::start();
        let _time = mock_server_time(&server);
        let client = create_authenticated(&server)?;

        let order_mock = server.mock(|when, then| {
            when.method(httpmock::Method::GET)
                .path(format!("/orders/{ORDER_ID}"));
            then.status(StatusCode::OK).json_body(json!({
                "id": ORDER_ID,
                "size": "1.00000000",
                "product_id": "BTC-USD",
                "side": "sell",
                "stp": "dc",
                "funds": "9.9750623400000000",
                "type": "market",
                "post_only": false,
                "created_at": "2016-12-08T20:09:05.508883Z",
                "done_at": "2016-12-08T20:09:05.527Z",
                "done_reason": "filled",
                "fill_fees": "0.0249376391550000",
                "filled_size": "0.01291771",
                "executed_value": "9.9750556620000000",
                "status": "done",
                "settled": true
            }));
        });
        let fills_mock = server.mock(|when, then| {
            when.method(httpmock::Method::GET)
                .path("/fills")
                .query_param("product_id", "BTC-USD");
            then.status(StatusCode::OK).json_body(json!([
                {
                    "trade_id": 74,
                    "product_id": "BTC-USD",
                    "price": "10.00",
                    "size": "0.01",
                    "order_id": ORDER_ID,
                    "created_at": "2014-11-07T22:19:28.578544Z",
                    "liquidity": "T",
                    "fee": "0.00025",
                    "settled": true,
                    "side": "buy"
                }
            ]));
        });

        let order = client.order(Uuid::parse_str(ORDER_ID)?).await?;
        assert_eq!(order.status, OrderStatus::Done);
        assert!(order.settled);
        assert_eq!(order.price, None);

        let fills = client
            .fills(&FillsRequest::builder().product_id("BTC-USD").build())
            .await?;
        assert_eq!(fills[0].liquidity, Liquidity::Taker);
        assert_eq!(fills[0].fee, dec!(0.00025));

        order_mock.assert();
        fills_mock.assert();

        Ok(())
    }
}
