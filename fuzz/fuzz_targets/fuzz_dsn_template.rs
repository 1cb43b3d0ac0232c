#![no_main]

use libfuzzer_sys::arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;
use pg_rotating::credential::Credential;
use pg_rotating::DsnTemplate;

#[derive(Debug)]
struct TemplateInput {
    template: String,
    username: String,
    password: String,
}

impl<'a> Arbitrary<'a> for TemplateInput {
    fn arbitrary(u: &mut Unstructured<'a>) -> libfuzzer_sys::arbitrary::Result<Self> {
        let template: String = u.arbitrary()?;
        let username: String = u.arbitrary()?;
        let password: String = u.arbitrary()?;
        Ok(Self {
            template,
            username,
            password,
        })
    }
}

fuzz_target!(|input: TemplateInput| {
    let Ok(template) = DsnTemplate::parse(&input.template) else {
        return;
    };

    // Display must reproduce something that parses to the same template.
    let reparsed = DsnTemplate::parse(&template.to_string()).expect("display must re-parse");
    assert_eq!(reparsed, template);

    // Userinfo is escaped, so rendering adds exactly one '@'.
    let dsn = template.render(&Credential::new(input.username, input.password));
    assert_eq!(
        dsn.with_secrets().matches('@').count(),
        1 + template.to_string().matches('@').count()
    );
});
