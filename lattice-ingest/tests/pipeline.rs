use lattice_core::{edge_key, storage_key, EntityGraph};
use lattice_graph::EdgeClass;
use lattice_ingest::{run_graph, run_search, SEARCH_COLLECTION};
use lattice_sink::{BatchWriter, MemorySink, StoreSink};
use std::fs;
use tempfile::tempdir;

const INPUT: &str = r#"{
    "shop": {"name": "shop", "kind": "module", "filepath": "shop/__init__.py"},
    "shop.cart": {
        "name": "cart",
        "kind": "module",
        "filepath": "shop/cart.py",
        "relations": [
            {"rel_type": "IMPORTS", "source": "shop.cart", "target": "shop"}
        ]
    },
    "shop.cart.MAX_ITEMS": {
        "name": "MAX_ITEMS",
        "kind": "assignment",
        "parent_qualified_name": "shop.cart",
        "pos": {"start": 2, "end": 2}
    },
    "shop.cart.Base": {
        "name": "Base",
        "kind": "class",
        "parent_qualified_name": "shop.cart"
    },
    "shop.cart.Cart": {
        "name": "Cart",
        "kind": "class",
        "docstring": "A shopping cart.",
        "parent_qualified_name": "shop.cart",
        "pos": {"start": 10, "end": 40},
        "relations": [
            {"rel_type": "INHERITS_FROM", "source": "shop.cart.Cart", "target": "shop.cart.Base"},
            {"rel_type": "CLASS_DEF", "source": "shop.cart.Cart", "target": "shop.cart"},
            {"rel_type": "PARAM_OF", "source": "shop.cart.Cart", "target": "shop.cart.checkout"}
        ]
    },
    "shop.cart.Cart.__init__": {
        "name": "__init__",
        "kind": "function",
        "parent_qualified_name": "shop.cart.Cart",
        "relations": [
            {"rel_type": "FUNCTION_DEF", "source": "shop.cart.Cart.__init__", "target": "shop.cart.Cart"}
        ]
    },
    "shop.cart.checkout": {
        "name": "checkout",
        "kind": "async_function",
        "parent_qualified_name": "shop.cart",
        "code": "async def checkout():\n    cart = Cart()\n    total = 0",
        "relations": [
            {"rel_type": "CALLS", "source": "shop.cart.checkout", "target": "shop.cart.Cart", "pos": {"start": 51}},
            {"rel_type": "CALLS", "source": "shop.cart.checkout", "target": "shop.cart.Base"},
            {"rel_type": "RETURNS", "source": "shop.cart.checkout", "target": "shop.cart.Cart"},
            {"rel_type": "FUNCTION_DEF", "source": "shop.cart.checkout", "target": "shop.cart"},
            {"rel_type": "DECORATED_BY", "source": "shop.cart.checkout", "target": "shop.cart.traced"},
            {"rel_type": "PARAM_OF", "source": "shop.cart.checkout", "target": "shop.cart.Cart"}
        ]
    },
    "shop.cart.traced": {
        "name": "traced",
        "kind": "function",
        "parent_qualified_name": "shop.cart"
    },
    "shop.cart.checkout.assignment.cart.total": {
        "name": "total",
        "kind": "assignment",
        "parent_qualified_name": "shop.cart.checkout.assignment.cart"
    },
    "shop.cart.checkout.param.coupon": {
        "name": "coupon",
        "kind": "params_of",
        "parent_qualified_name": "shop.cart.checkout"
    }
}"#;

fn load() -> EntityGraph {
    let dir = tempdir().unwrap();
    let path = dir.path().join("output.json");
    fs::write(&path, INPUT).unwrap();
    EntityGraph::load(&path).unwrap()
}

#[test]
fn graph_run_routes_nodes_and_edges() {
    let entities = load();
    let mut sink = MemorySink::new();
    let stats = run_graph(&entities, BatchWriter::new(&mut sink, 3));

    // Function-local assignment and the synthetic parameter produce no node.
    assert_eq!(stats.nodes_classified, 8);
    assert_eq!(sink.count("modules"), 2);
    assert_eq!(sink.count("types"), 2);
    assert_eq!(sink.count("functions"), 3);
    assert_eq!(sink.count("members"), 1);
    assert_eq!(
        sink.documents("members")[0]["_key"],
        storage_key("shop.cart.MAX_ITEMS")
    );

    let checkout = sink
        .documents("functions")
        .iter()
        .find(|d| d["qname"] == "shop.cart.checkout")
        .unwrap();
    assert_eq!(checkout["kind"], "function");
    assert_eq!(checkout["is_async"], true);
    assert_eq!(checkout["is_method"], false);

    let init = sink
        .documents("functions")
        .iter()
        .find(|d| d["qname"] == "shop.cart.Cart.__init__")
        .unwrap();
    assert_eq!(init["is_method"], true);

    assert_eq!(sink.count("imports"), 1);
    assert_eq!(sink.count("inherits"), 1);
    assert_eq!(sink.count("returns"), 1);
    // __init__ -> Cart and checkout -> shop.cart.
    assert_eq!(sink.count("parent"), 2);

    let params = sink.documents("param_of");
    assert_eq!(params.len(), 1);
    assert_eq!(params[0]["_from"], format!("types/{}", storage_key("shop.cart.Cart")));
    assert_eq!(
        params[0]["_to"],
        format!("functions/{}", storage_key("shop.cart.checkout"))
    );

    let decorated = sink.documents("decorated_by");
    assert_eq!(decorated.len(), 1);
    assert_eq!(
        decorated[0]["_key"],
        edge_key("shop.cart.checkout", "shop.cart.traced", "DECORATED_BY")
    );
    assert_eq!(
        decorated[0]["_to"],
        format!("functions/{}", storage_key("shop.cart.traced"))
    );

    // CLASS_DEF from a type and PARAM_OF from a function are rejected.
    assert_eq!(stats.dropped.get("constraint_violation"), Some(&2));
    // Base has no __init__.
    assert_eq!(stats.dropped.get("missing_initializer"), Some(&1));
    assert_eq!(stats.edges_written, 8);
}

#[test]
fn constructor_call_lands_on_initializer() {
    let entities = load();
    let mut sink = MemorySink::new();
    run_graph(&entities, BatchWriter::new(&mut sink, 100));

    let calls = sink.documents("calls");
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0]["_key"],
        edge_key("shop.cart.checkout", "shop.cart.Cart.__init__", "CALLS")
    );
    assert_eq!(
        calls[0]["_from"],
        format!("functions/{}", storage_key("shop.cart.checkout"))
    );
    assert_eq!(calls[0]["call_site_pos"], 51);
}

#[test]
fn every_edge_respects_its_class_constraint() {
    let entities = load();
    let mut sink = MemorySink::new();
    run_graph(&entities, BatchWriter::new(&mut sink, 1));

    let mut checked = 0;
    for class in EdgeClass::ALL {
        let sources: Vec<&str> = class.sources().iter().map(|c| c.as_str()).collect();
        let targets: Vec<&str> = class.targets().iter().map(|c| c.as_str()).collect();
        for edge in sink.documents(class.as_str()) {
            let from_class = edge["_from"].as_str().unwrap().split('/').next().unwrap();
            let to_class = edge["_to"].as_str().unwrap().split('/').next().unwrap();
            assert!(sources.contains(&from_class), "{} from {}", class, from_class);
            assert!(targets.contains(&to_class), "{} to {}", class, to_class);
            checked += 1;
        }
    }
    assert_eq!(checked, 8);
}

#[test]
fn runs_do_not_depend_on_insertion_order() {
    let entities = load();
    let mut reversed = EntityGraph::new();
    let records: Vec<_> = entities.iter().collect();
    for (qname, entity) in records.into_iter().rev() {
        reversed.insert(qname, entity.clone());
    }

    let mut first = MemorySink::new();
    let mut second = MemorySink::new();
    run_graph(&entities, BatchWriter::new(&mut first, 2));
    run_graph(&reversed, BatchWriter::new(&mut second, 2));

    assert_eq!(first.batches(), second.batches());
    for collection in first.collections() {
        assert_eq!(first.documents(collection), second.documents(collection));
    }
}

#[test]
fn rerun_into_store_is_idempotent() {
    let entities = load();
    let dir = tempdir().unwrap();
    let mut store = StoreSink::open(dir.path()).unwrap();

    let first = run_graph(&entities, BatchWriter::new(&mut store, 4));
    let types = store.count("types").unwrap();
    let calls = store.count("calls").unwrap();

    let second = run_graph(&entities, BatchWriter::new(&mut store, 4));
    assert_eq!(first.nodes_written, second.nodes_written);
    assert_eq!(store.count("types").unwrap(), types);
    assert_eq!(store.count("calls").unwrap(), calls);
    assert_eq!(second.failed_batches, 0);
}

#[test]
fn search_run_indexes_searchable_entities() {
    let entities = load();
    let mut sink = MemorySink::new();
    let stats = run_search(&entities, SEARCH_COLLECTION, BatchWriter::new(&mut sink, 100));

    // Modules, classes, functions and both assignments; not the parameter.
    assert_eq!(stats.indexed, 9);
    assert_eq!(stats.written, 9);

    let docs = sink.documents(SEARCH_COLLECTION);
    let checkout = docs
        .iter()
        .find(|d| d["id"] == "shop_cart_checkout")
        .unwrap();
    assert_eq!(checkout["kind"], "async_function");
    assert_eq!(checkout["language"], "python");
    assert!(checkout["code"].as_str().unwrap().contains("Cart()"));
    assert!(checkout.get("pos").is_none());

    let max = docs
        .iter()
        .find(|d| d["qname"] == "shop.cart.MAX_ITEMS")
        .unwrap();
    let variants: Vec<_> = max["name_variants"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(
        variants,
        vec!["MAX_ITEMS", "max_items", "m_a_x__i_t_e_m_s", "MAXITEMS"]
    );
}
