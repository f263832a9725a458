use std::collections::HashMap;
use std::io::Cursor;

use pxf_resolver::fragment::parse_fragments_response;
use pxf_resolver::partition::{DescriptorFormat, HIVE_DEFAULT_PARTITION};
use pxf_resolver::{
    DataType, FragmentRows, LineRowSource, RawRow, ResolverError, ResolverKind, ResolverOptions,
    create_resolver,
};

fn hive_descriptor(values: &[&str]) -> String {
    values
        .iter()
        .enumerate()
        .map(|(idx, v)| format!("p{idx}!H1PD!string!H1PD!{v}"))
        .collect::<Vec<_>>()
        .join("!HPD!")
}

#[test]
fn appends_one_segment_per_partition_column() {
    let cases: &[&[&str]] = &[
        &["a"],
        &["a", "b"],
        &["", ""],
        &["x", "", "z"],
        &["2020", "jan", "01", "eu"],
    ];

    for values in cases {
        let meta = format!("serde!HUDD!{}", hive_descriptor(values));
        let resolver =
            create_resolver(ResolverKind::StringPass, meta.as_bytes(), &ResolverOptions::default())
                .unwrap();

        assert_eq!(values.len(), resolver.partitions().num_partitions());

        let fields = resolver.resolve(&RawRow::new("row")).unwrap();
        assert_eq!(1, fields.len());

        let value = &fields[0].value;
        let appended: Vec<&str> = value
            .strip_prefix("row,")
            .unwrap()
            .split(',')
            .collect();
        assert_eq!(values.to_vec(), appended);
    }
}

#[test]
fn zero_partitions_returns_content() {
    let resolver = create_resolver(
        ResolverKind::StringPass,
        b"serde!HUDD!!HNPT!!HUDD!true",
        &ResolverOptions::default(),
    )
    .unwrap();

    for content in ["plainrow", "", "a,b,c"] {
        let fields = resolver.resolve(&RawRow::new(content.to_string())).unwrap();
        assert_eq!(1, fields.len());
        assert_eq!(content, fields[0].value);
        assert_eq!(DataType::Varchar, fields[0].data_type);
    }
}

#[test]
fn sectioned_descriptor_example() {
    let opts = ResolverOptions::default().with_descriptor_format(DescriptorFormat::Sectioned);
    let resolver = create_resolver(
        ResolverKind::StringPass,
        b"ignored!HUDD!year=2020,month=jan|type=string,type=string|2020,jan",
        &opts,
    )
    .unwrap();

    let fields = resolver.resolve(&RawRow::new("42,hello")).unwrap();
    assert_eq!("42,hello,2020,jan", fields[0].value);
}

#[test]
fn default_partition_is_null() {
    let meta = format!(
        "serde!HUDD!{}",
        hive_descriptor(&[HIVE_DEFAULT_PARTITION, "jan"])
    );
    let resolver =
        create_resolver(ResolverKind::StringPass, meta.as_bytes(), &ResolverOptions::default())
            .unwrap();

    let fields = resolver.resolve(&RawRow::new("1")).unwrap();
    assert_eq!("1,\\N,jan", fields[0].value);
}

#[test]
fn malformed_metadata_before_any_row() {
    for meta in [
        "",
        "serde-only",
        "serde!HUDD!",
        "serde!HUDD!!HUDD!true",
        "serde!HUDD!year!H1PD!int",
    ] {
        let err = create_resolver(
            ResolverKind::StringPass,
            meta.as_bytes(),
            &ResolverOptions::default(),
        )
        .unwrap_err();
        assert!(
            matches!(err, ResolverError::MalformedMetadata(_)),
            "meta: {meta}, err: {err}"
        );
    }
}

#[test]
fn listing_to_rows() {
    logutil::init_test();

    let listing = r#"{"PXFFragments":[
        {"hosts":["h1"],"sourceName":"/warehouse/t/dt=2024-01-15/part-0","userData":"serde!HUDD!dt!H1PD!date!H1PD!2024-01-15!HUDD!false"},
        {"hosts":["h2"],"sourceName":"/warehouse/t/dt=2024-01-16/part-0","userData":"serde!HUDD!dt!H1PD!date!H1PD!2024-01-16!HUDD!false"}
    ]}"#;

    let props = HashMap::from([("DELIMITER".to_string(), "\\x7c".to_string())]);
    let opts = ResolverOptions::from_user_properties(&props).unwrap();

    let fragments = parse_fragments_response(listing).unwrap();
    let contents = ["1|a\n2|b\n", "3|c\r\n"];

    let mut out = Vec::new();
    for (fragment, content) in fragments.iter().zip(contents) {
        let meta = fragment.user_data.as_ref().unwrap();
        let resolver = create_resolver(ResolverKind::StringPass, meta, &opts).unwrap();

        let source = LineRowSource::new(Cursor::new(content));
        for fields in FragmentRows::new(source, resolver.as_ref()) {
            let mut fields = fields.unwrap();
            assert_eq!(1, fields.len());
            out.push(fields.remove(0).value);
        }
    }

    assert_eq!(
        vec!["1|a|2024-01-15", "2|b|2024-01-15", "3|c|2024-01-16"],
        out
    );
}
