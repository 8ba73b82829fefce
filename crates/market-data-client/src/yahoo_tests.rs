#[cfg(test)]
mod tests {
    use super::super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> YahooClient {
        YahooClient::new(YahooConfig {
            base_url: server.uri(),
            search_url: server.uri(),
            cookie_url: None,
            rate_limit: 100,
            timeout: Duration::from_secs(5),
        })
    }

    fn summary_body() -> Value {
        json!({
            "quoteSummary": {
                "result": [{
                    "price": {
                        "longName": "Apple Inc.",
                        "shortName": "Apple",
                        "quoteType": "EQUITY",
                        "regularMarketPrice": {"raw": 189.5, "fmt": "189.50"},
                        "regularMarketChange": {"raw": 2.1},
                        "regularMarketChangePercent": {"raw": 0.0112},
                        "marketCap": {"raw": 2.9e12}
                    },
                    "summaryProfile": {
                        "sector": "Technology",
                        "industry": "Consumer Electronics",
                        "fullTimeEmployees": 161000
                    },
                    "assetProfile": {
                        "companyOfficers": [
                            {"name": "Jeff Williams", "title": "COO"},
                            {"name": "Tim Cook", "title": "CEO & Director"}
                        ]
                    },
                    "summaryDetail": {"trailingPE": {"raw": 29.4}, "beta": {"raw": 1.28}},
                    "financialData": {"returnOnAssets": {"raw": 0.22}, "debtToEquity": {"raw": 145.0}},
                    "majorHoldersBreakdown": {"institutionsPercentHeld": {"raw": 0.61}},
                    "institutionOwnership": {
                        "ownershipList": [
                            {"organization": "Vanguard Group", "position": {"raw": 1.3e9}, "pctChange": {"raw": 0.01}}
                        ]
                    },
                    "recommendationTrend": {
                        "trend": [
                            {"period": "-1m", "strongBuy": 1, "buy": 1, "hold": 1, "sell": 0, "strongSell": 0},
                            {"period": "0m", "strongBuy": 11, "buy": 21, "hold": 6, "sell": 1, "strongSell": 0}
                        ]
                    }
                }],
                "error": null
            }
        })
    }

    #[tokio::test]
    async fn test_ticker_info_parses_quote_summary() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v10/finance/quoteSummary/AAPL"))
            .respond_with(ResponseTemplate::new(200).set_body_json(summary_body()))
            .mount(&server)
            .await;

        let info = client_for(&server).get_ticker_info("AAPL").await.unwrap();
        assert_eq!(info.display_name(), "Apple Inc.");
        assert_eq!(info.price, Some(189.5));
        assert!((info.change_percent.unwrap() - 1.12).abs() < 1e-9);
        assert_eq!(info.sector.as_deref(), Some("Technology"));
        assert_eq!(info.employees, Some(161000));
        assert_eq!(info.ceo.as_deref(), Some("Tim Cook"));
        assert!((info.debt_to_equity.unwrap() - 1.45).abs() < 1e-9);
        assert_eq!(info.institutional_ownership, Some(0.61));
        assert_eq!(info.top_holders.len(), 1);

        let ratings = info.analyst_ratings.unwrap();
        assert_eq!(ratings.strong_buy, 11);
        assert_eq!(ratings.total(), 39);
    }

    #[tokio::test]
    async fn test_ticker_info_without_price_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v10/finance/quoteSummary/DELISTED"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "quoteSummary": {"result": [{"price": {"shortName": "Gone"}}], "error": null}
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).get_ticker_info("DELISTED").await.unwrap_err();
        assert!(matches!(err, AnalysisError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_http_404_maps_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v10/finance/quoteSummary/ZZZZ"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server).get_ticker_info("ZZZZ").await.unwrap_err();
        assert!(matches!(err, AnalysisError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_server_error_is_recoverable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v10/finance/quoteSummary/AAPL"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server).get_ticker_info("AAPL").await.unwrap_err();
        assert!(err.is_recoverable());
    }

    #[tokio::test]
    async fn test_crumb_is_forwarded_when_available() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/test/getcrumb"))
            .respond_with(ResponseTemplate::new(200).set_body_string("abc123"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v10/finance/quoteSummary/AAPL"))
            .and(query_param("crumb", "abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(summary_body()))
            .expect(1)
            .mount(&server)
            .await;

        let info = client_for(&server).get_ticker_info("AAPL").await.unwrap();
        assert_eq!(info.symbol, "AAPL");
    }

    #[tokio::test]
    async fn test_statements_use_canonical_labels() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v10/finance/quoteSummary/MSFT"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "quoteSummary": {"result": [{
                    "incomeStatementHistory": {"incomeStatementHistory": [
                        {"endDate": {"raw": 1656547200, "fmt": "2022-06-30"}, "totalRevenue": {"raw": 198.0}, "maxAge": 1},
                        {"endDate": {"raw": 1688083200, "fmt": "2023-06-30"}, "totalRevenue": {"raw": 211.0}, "costOfRevenue": {"raw": 65.0}}
                    ]},
                    "balanceSheetHistory": {"balanceSheetStatements": [
                        {"endDate": {"fmt": "2023-06-30"}, "cash": {"raw": 34.0}, "longTermDebt": {"raw": 41.0}, "shortLongTermDebt": {"raw": 5.0}}
                    ]},
                    "cashflowStatementHistory": {"cashflowStatements": [
                        {"endDate": {"fmt": "2023-06-30"}, "totalCashFromOperatingActivities": {"raw": 87.0}, "capitalExpenditures": {"raw": -28.0}}
                    ]}
                }]}
            })))
            .mount(&server)
            .await;

        let statements = client_for(&server).get_statements("MSFT").await.unwrap();
        assert_eq!(statements.income.series("Total Revenue", 5), vec![211.0, 198.0]);
        assert_eq!(statements.income.latest("Cost Of Revenue"), Some(65.0));
        assert!(!statements.income.contains("Max Age"));
        assert_eq!(statements.balance_sheet.latest("Total Debt"), Some(46.0));
        assert_eq!(statements.cash_flow.latest("Operating Cash Flow"), Some(87.0));
        assert_eq!(statements.cash_flow.latest("Capital Expenditure"), Some(-28.0));
    }

    #[tokio::test]
    async fn test_price_history_skips_null_closes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/AAPL"))
            .and(query_param("range", "1y"))
            .and(query_param("interval", "1d"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "chart": {"result": [{
                    "timestamp": [1700000000, 1700086400, 1700172800],
                    "indicators": {"quote": [{
                        "open": [1.0, null, 3.0],
                        "high": [1.5, null, 3.5],
                        "low": [0.5, null, 2.5],
                        "close": [1.2, null, 3.1],
                        "volume": [100, null, 300]
                    }]}
                }], "error": null}
            })))
            .mount(&server)
            .await;

        let bars = client_for(&server)
            .get_price_history("AAPL", HistoryRange::Year1)
            .await
            .unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[1].close, 3.1);
        assert_eq!(bars[1].volume, 300.0);
    }

    #[tokio::test]
    async fn test_options_chain_nearest_expiration() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v7/finance/options/AAPL"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "optionChain": {"result": [{
                    "options": [{
                        "expirationDate": 1700179200,
                        "calls": [{"strike": 190.0, "volume": 1200, "impliedVolatility": 0.25}],
                        "puts": [{"strike": 185.0, "volume": 800}, {"volume": 5}]
                    }]
                }]}
            })))
            .mount(&server)
            .await;

        let chain = client_for(&server).get_options_chain("AAPL").await.unwrap();
        assert!(chain.expiration.is_some());
        assert_eq!(chain.calls.len(), 1);
        // contracts without a strike are dropped
        assert_eq!(chain.puts.len(), 1);
        assert_eq!(chain.calls[0].implied_volatility, Some(0.25));
    }

    #[tokio::test]
    async fn test_search_hits() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/finance/search"))
            .and(query_param("q", "apple"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "quotes": [
                    {"symbol": "AAPL", "shortname": "Apple Inc.", "quoteType": "EQUITY", "exchange": "NMS"},
                    {"symbol": "APLE", "longname": "Apple Hospitality REIT", "quoteType": "EQUITY"},
                    {"shortname": "no symbol"}
                ]
            })))
            .mount(&server)
            .await;

        let hits = client_for(&server).search_symbols("apple").await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].name.as_deref(), Some("Apple Inc."));
        assert!(hits[0].is_equity());
    }
}
