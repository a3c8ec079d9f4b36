mod common;

use common::fixtures::{bookstore, inventory, nested};
use common::{TestResult, init_logging, query, strings_of};
use pathq::{EngineConfig, JPathError, JsonPath, evaluate};
use serde_json::json;

#[test]
fn test_child_and_wildcard_paths() -> TestResult {
    let data = bookstore();
    let authors = query(&data, "$.store.book[*].author")?;
    assert_eq!(
        authors,
        vec![
            json!("Nigel Rees"),
            json!("Evelyn Waugh"),
            json!("Herman Melville"),
            json!("J. R. R. Tolkien"),
        ]
    );

    let prices = query(&data, "$.store.*.price")?;
    assert_eq!(prices, vec![json!(19.95)]);
    Ok(())
}

#[test]
fn test_recursive_descent_finds_nested_keys() -> TestResult {
    let data = bookstore();
    let titles = query(&data, "$..book[2].title")?;
    assert_eq!(titles, vec![json!("Moby Dick")]);

    let prices = query(&data, "$..price")?;
    assert_eq!(
        prices,
        vec![json!(8.95), json!(12.99), json!(8.99), json!(22.99), json!(19.95)]
    );
    Ok(())
}

#[test]
fn test_slices() -> TestResult {
    let data = bookstore();
    let last_two = query(&data, "$.store.book[-2:]")?;
    assert_eq!(strings_of(&last_two, "title"), vec!["Moby Dick", "The Lord of the Rings"]);

    let first_two = query(&data, "$.store.book[:2]")?;
    assert_eq!(strings_of(&first_two, "title"), vec!["Sayings of the Century", "Sword of Honour"]);

    assert!(query(&data, "$.store.book[7:9]")?.is_empty());
    Ok(())
}

#[test]
fn test_filters_over_bookstore() -> TestResult {
    let data = bookstore();
    let cheap = query(&data, "$.store.book[?(@.price < $.expensive)]")?;
    assert_eq!(strings_of(&cheap, "title"), vec!["Sayings of the Century", "Moby Dick"]);

    let with_isbn = query(&data, "$.store.book[?(@.isbn)].title")?;
    assert_eq!(with_isbn, vec![json!("Moby Dick"), json!("The Lord of the Rings")]);

    let tolkien = query(&data, "$.store.book[?(@.author =~ /j\\. r\\. r\\./i)].title")?;
    assert_eq!(tolkien, vec![json!("The Lord of the Rings")]);

    let fiction_under_20 = query(
        &data,
        "$.store.book[?(@.category == \"fiction\" && @.price <= 20)].title",
    )?;
    assert_eq!(fiction_under_20, vec![json!("Sword of Honour"), json!("Moby Dick")]);
    Ok(())
}

#[test]
fn test_filters_with_sets_and_sizes() -> TestResult {
    let data = inventory();
    let skus = |expression: &str| -> Result<Vec<String>, JPathError> {
        Ok(query(&data, expression)?
            .iter()
            .filter_map(|v| v["sku"].as_str().map(String::from))
            .collect())
    };

    assert_eq!(skus("$.items[?(@.sizes subsetof ['S', 'M'])]")?, vec!["a1", "d4"]);
    assert_eq!(skus("$.items[?('L' in @.sizes)]")?, vec!["b2", "c3"]);
    assert_eq!(skus("$.items[?(@.tags anyof ['new'])]")?, vec!["c3", "d4"]);
    assert_eq!(skus("$.items[?(@.tags empty)]")?, vec!["b2"]);
    assert_eq!(skus("$.items[?(@.sizes size 3)]")?, vec!["c3"]);
    assert_eq!(skus("$.items[?(@.sku in ['a1', 'zz'])]")?, vec!["a1"]);
    Ok(())
}

#[test]
fn test_numeric_filter_skips_mismatched_types() -> TestResult {
    let data = inventory();
    let in_stock = query(&data, "$.items[?(@.qty >= 0)].sku")?;
    assert_eq!(in_stock, vec![json!("a1"), json!("d4")]);

    let exactly_four = query(&data, "$.items[?(@.qty == 4)].sku")?;
    assert_eq!(exactly_four, vec![json!("a1")]);
    Ok(())
}

#[test]
fn test_aggregate_functions() -> TestResult {
    let data = inventory();
    assert_eq!(query(&data, "$.readings[*].sum()")?, vec![json!(10), json!(6.0), json!(0)]);
    assert_eq!(query(&data, "$.readings[*].max()")?, vec![json!(4), json!(3.5)]);
    assert_eq!(query(&data, "$.readings[*].avg()")?, vec![json!(2.5), json!(3.0)]);
    assert_eq!(query(&data, "$.readings.length()")?, vec![json!(4)]);
    assert_eq!(
        query(&data, "$.items[0].keys()")?,
        vec![json!("sku"), json!("qty"), json!("sizes"), json!("tags")]
    );
    Ok(())
}

#[test]
fn test_aborted_queries_are_empty_but_strict_queries_fail() {
    init_logging();
    let data = bookstore();
    for expression in [
        "$.store.book[0,9]",
        "$.store.book[?(@.price <> 3)]",
        "$.store.book.median()",
        "$.store book",
    ] {
        assert_eq!(evaluate(&data, expression), Ok(vec![]), "{}", expression);
        assert!(
            JsonPath::new(&data, expression).try_evaluate().is_err(),
            "{}",
            expression
        );
    }
}

#[test]
fn test_expressions_must_start_at_root() {
    init_logging();
    let data = bookstore();
    assert_eq!(
        evaluate(&data, "@.store"),
        Err(JPathError::MalformedQuery("@.store".into()))
    );
}

#[test]
fn test_results_are_detached_from_document() -> TestResult {
    let data = bookstore();
    let mut results = query(&data, "$.store.bicycle")?;
    results[0]["color"] = json!("blue");
    assert_eq!(data["store"]["bicycle"]["color"], json!("red"));
    Ok(())
}

#[test]
fn test_depth_limit_is_configurable() -> TestResult {
    init_logging();
    let data = nested(10);
    let shallow = EngineConfig::new().with_max_depth(4);

    let everything = query(&data, "$..")?;
    assert_eq!(everything.len(), 10);

    assert_eq!(
        JsonPath::new(&data, "$..").with_config(shallow).try_evaluate(),
        Err(JPathError::DepthLimitExceeded(4))
    );
    assert!(JsonPath::new(&data, "$..").with_config(shallow).evaluate()?.is_empty());
    Ok(())
}

#[test]
fn test_repeated_evaluation_is_stable() -> TestResult {
    let data = bookstore();
    let expression = "$..book[?(@.price > 10 || @.category == 'reference')].title";
    let first = query(&data, expression)?;
    assert_eq!(first.len(), 3);
    assert_eq!(first, query(&data, expression)?);
    Ok(())
}
