//! Translation tables, one per language with its own copy.
//!
//! German has no table and falls back to English wholesale.

pub(super) const EN: &[(&str, &str)] = &[
    ("nav.home", "Home"),
    ("nav.products", "Products"),
    ("nav.news", "News"),
    ("nav.contact", "Contact"),
    ("footer.rights", "All rights reserved."),
    ("language.label", "Language"),
    ("page.fallback_title", "Something went wrong"),
    (
        "page.fallback_message",
        "This page could not be loaded right now. Please contact us and we will be happy to help.",
    ),
    ("page.not_found", "This page has no content yet."),
    ("hero.learn_more", "Learn more"),
    ("faq.title", "Frequently asked questions"),
    ("specification.title", "Specifications"),
    ("news.title", "News"),
    ("news.read_more", "Read more"),
    ("video.unsupported", "Your browser does not support embedded videos."),
];

pub(super) const ZH: &[(&str, &str)] = &[
    ("nav.home", "首页"),
    ("nav.products", "产品"),
    ("nav.news", "新闻"),
    ("nav.contact", "联系我们"),
    ("footer.rights", "版权所有。"),
    ("language.label", "语言"),
    ("page.fallback_title", "出现了问题"),
    ("page.fallback_message", "此页面暂时无法加载。请联系我们，我们将乐意为您提供帮助。"),
    ("page.not_found", "此页面暂无内容。"),
    ("hero.learn_more", "了解更多"),
    ("faq.title", "常见问题"),
    ("specification.title", "规格参数"),
    ("news.title", "新闻"),
    ("news.read_more", "阅读全文"),
];

pub(super) const JA: &[(&str, &str)] = &[
    ("nav.home", "ホーム"),
    ("nav.products", "製品"),
    ("nav.news", "ニュース"),
    ("nav.contact", "お問い合わせ"),
    ("footer.rights", "無断転載を禁じます。"),
    ("language.label", "言語"),
    ("page.fallback_title", "問題が発生しました"),
    (
        "page.fallback_message",
        "現在このページを読み込めません。お手数ですがお問い合わせください。",
    ),
    ("hero.learn_more", "詳しく見る"),
    ("faq.title", "よくある質問"),
    ("specification.title", "仕様"),
    ("news.read_more", "続きを読む"),
];

pub(super) const KO: &[(&str, &str)] = &[
    ("nav.home", "홈"),
    ("nav.products", "제품"),
    ("nav.news", "뉴스"),
    ("nav.contact", "문의하기"),
    ("footer.rights", "모든 권리 보유."),
    ("language.label", "언어"),
    ("page.fallback_title", "문제가 발생했습니다"),
    (
        "page.fallback_message",
        "지금은 이 페이지를 불러올 수 없습니다. 문의해 주시면 기꺼이 도와드리겠습니다.",
    ),
    ("hero.learn_more", "자세히 보기"),
    ("faq.title", "자주 묻는 질문"),
    ("specification.title", "사양"),
    ("news.read_more", "더 보기"),
];
