pub const SCHEMES: [groupsig::SchemeCode; 4] = [
    groupsig::SchemeCode::GL19,
    groupsig::SchemeCode::PS16,
    groupsig::SchemeCode::DL21,
    groupsig::SchemeCode::DL21SEQ,
];

/// Context with a fully set up group of `$member_count` members for the scheme `$code`
#[macro_export]
macro_rules! setup_group {
    ($code: expr, $member_count: expr, $ctx: ident, $rng: ident, $group: ident, $members: ident) => {
        let $ctx = groupsig::SchemeContext::init($code, 1).unwrap();
        let mut $rng = $ctx.rng();
        let mut $group = test_utils::setup_group(&$ctx, &mut $rng).unwrap();
        let $members = (0..$member_count)
            .map(|_| test_utils::add_member(&$ctx, &mut $rng, &mut $group).unwrap())
            .collect::<Vec<_>>();
    };
}
