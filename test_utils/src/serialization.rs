/// Check that an arkworks object survives canonical serialization in both modes as well as JSON and
/// MessagePack. The caller needs `serde_json` and `rmp_serde` as dependencies.
#[macro_export]
macro_rules! test_serialization {
    ($obj_type:ty, $obj: expr) => {
        let mut serz = vec![];
        ark_serialize::CanonicalSerialize::serialize_compressed(&$obj, &mut serz).unwrap();
        log::debug!("{} serialized to {} bytes", stringify!($obj_type), serz.len());
        let deserz: $obj_type =
            ark_serialize::CanonicalDeserialize::deserialize_compressed(&serz[..]).unwrap();
        assert_eq!(deserz, $obj);

        let mut serz = vec![];
        ark_serialize::CanonicalSerialize::serialize_uncompressed(&$obj, &mut serz).unwrap();
        let deserz: $obj_type =
            ark_serialize::CanonicalDeserialize::deserialize_uncompressed(&serz[..]).unwrap();
        assert_eq!(deserz, $obj);

        let ser = serde_json::to_string(&$obj).unwrap();
        let deser = serde_json::from_str::<$obj_type>(&ser).unwrap();
        assert_eq!($obj, deser);

        let ser = rmp_serde::to_vec_named(&$obj).unwrap();
        let deser = rmp_serde::from_slice::<$obj_type>(&ser).unwrap();
        assert_eq!($obj, deser);
    };
}

/// Check that a scheme object exports to text and imports back unchanged, and that importing the
/// text for another scheme fails.
#[macro_export]
macro_rules! test_export {
    ($obj_type:ty, $obj: expr) => {
        let text = $obj.export().unwrap();
        assert!(text.is_ascii());
        let imported = <$obj_type>::import($obj.code(), &text).unwrap();
        assert_eq!(imported, $obj);
        assert_eq!(imported.export().unwrap(), text);

        let other = groupsig::registry::schemes()
            .map(|s| s.description().code)
            .find(|c| *c != $obj.code())
            .unwrap();
        assert!(matches!(
            <$obj_type>::import(other, &text),
            Err(groupsig::GroupSigError::ImportSchemeMismatch { .. })
        ));
    };
}
