// src/registry.rs
//! The ordered set of datasets the pipeline extracts. Order here is output order.

use serde::Serialize;

use crate::extract::{activity, ads, identity, media, Extractor};

/// Display title in each supported UI language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LocalizedText {
    pub en: &'static str,
    pub nl: &'static str,
    pub de: &'static str,
}

impl LocalizedText {
    /// Text for `locale`, English for anything unknown.
    pub fn get(&self, locale: &str) -> &'static str {
        match locale {
            "nl" => self.nl,
            "de" => self.de,
            _ => self.en,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DatasetDescriptor {
    pub name: &'static str,
    /// Substring of the archive entry that holds this dataset.
    pub locate_pattern: &'static str,
    pub extractor: Extractor,
    pub title: LocalizedText,
}

impl DatasetDescriptor {
    pub fn needs_annotations(&self) -> bool {
        self.extractor.needs_annotations()
    }
}

const fn count(list_key: &'static str, column: &'static str) -> Extractor {
    Extractor::Count {
        list_key: Some(list_key),
        column,
    }
}

pub static REGISTRY: &[DatasetDescriptor] = &[
    DatasetDescriptor {
        name: "ads_clicked",
        locate_pattern: "ads_clicked",
        extractor: Extractor::Record(ads::extract_ads_clicked),
        title: LocalizedText {
            en: "Product names (ads) clicked per day",
            nl: "Aangeklikte advertenties per dag",
            de: "Angeklickte Werbeanzeigen pro Tag",
        },
    },
    DatasetDescriptor {
        name: "ads_viewed",
        locate_pattern: "ads_viewed",
        extractor: Extractor::Record(ads::extract_ads_viewed),
        title: LocalizedText {
            en: "Authors of ads viewed per day",
            nl: "Adverteerders van bekeken advertenties per dag",
            de: "Urheber gesehener Werbeanzeigen pro Tag",
        },
    },
    DatasetDescriptor {
        name: "posts_viewed",
        locate_pattern: "posts_viewed",
        extractor: Extractor::Record(ads::extract_posts_viewed),
        title: LocalizedText {
            en: "Number of posts viewed each day",
            nl: "Aantal bekeken berichten per dag",
            de: "Anzahl angesehener Beiträge pro Tag",
        },
    },
    DatasetDescriptor {
        name: "videos_watched",
        locate_pattern: "videos_watched",
        extractor: Extractor::Record(ads::extract_videos_watched),
        title: LocalizedText {
            en: "Number of videos watched each day",
            nl: "Aantal bekeken video's per dag",
            de: "Anzahl angesehener Videos pro Tag",
        },
    },
    DatasetDescriptor {
        name: "subscription_for_no_ads",
        locate_pattern: "subscription_for_no_ads",
        extractor: Extractor::Record(ads::extract_subscription_for_no_ads),
        title: LocalizedText {
            en: "Ad-free subscription?",
            nl: "Abonnement zonder advertenties?",
            de: "Werbefreies Abonnement?",
        },
    },
    DatasetDescriptor {
        name: "blocked_accounts",
        locate_pattern: "blocked_accounts",
        extractor: count("relationships_blocked_users", "blocked_accounts_count"),
        title: LocalizedText {
            en: "Number of accounts you have blocked",
            nl: "Aantal accounts dat je hebt geblokkeerd",
            de: "Anzahl der von dir blockierten Konten",
        },
    },
    DatasetDescriptor {
        name: "close_friends",
        locate_pattern: "close_friends",
        extractor: count("relationships_close_friends", "close_friends_count"),
        title: LocalizedText {
            en: "Number of close friends",
            nl: "Aantal naaste vrienden",
            de: "Anzahl enger Freunde",
        },
    },
    DatasetDescriptor {
        name: "followers",
        locate_pattern: "followers_1",
        extractor: Extractor::Count {
            list_key: None,
            column: "followers_count",
        },
        title: LocalizedText {
            en: "Number of followers",
            nl: "Aantal volgers",
            de: "Anzahl der Follower",
        },
    },
    DatasetDescriptor {
        name: "following",
        locate_pattern: "followers_and_following/following.json",
        extractor: count("relationships_following", "following_count"),
        title: LocalizedText {
            en: "Number of accounts you are following",
            nl: "Aantal accounts dat je volgt",
            de: "Anzahl der Konten, denen du folgst",
        },
    },
    DatasetDescriptor {
        name: "follow_requests_received",
        locate_pattern: "follow_requests_you've_received",
        extractor: count(
            "relationships_follow_requests_received",
            "received_follow_requests_count",
        ),
        title: LocalizedText {
            en: "Number of follow requests you have received",
            nl: "Aantal ontvangen volgverzoeken",
            de: "Anzahl erhaltener Follower-Anfragen",
        },
    },
    DatasetDescriptor {
        name: "hide_story_from",
        locate_pattern: "hide_story_from",
        extractor: count("relationships_hide_stories_from", "hide_story_from_count"),
        title: LocalizedText {
            en: "Number of accounts you have hidden your story from",
            nl: "Aantal accounts voor wie je je verhaal verbergt",
            de: "Anzahl der Konten, vor denen du deine Story verbirgst",
        },
    },
    DatasetDescriptor {
        name: "pending_follow_requests",
        locate_pattern: "pending_follow_requests",
        extractor: count(
            "relationships_follow_requests_sent",
            "pending_follow_requests_count",
        ),
        title: LocalizedText {
            en: "Number of your pending follow requests",
            nl: "Aantal openstaande volgverzoeken",
            de: "Anzahl offener Follower-Anfragen",
        },
    },
    DatasetDescriptor {
        name: "recently_unfollowed_accounts",
        locate_pattern: "recently_unfollowed_accounts",
        extractor: count(
            "relationships_unfollowed_users",
            "recently_unfollowed_accounts_count",
        ),
        title: LocalizedText {
            en: "Number of accounts you recently unfollowed",
            nl: "Aantal accounts dat je onlangs niet meer volgt",
            de: "Anzahl kürzlich entfolgter Konten",
        },
    },
    DatasetDescriptor {
        name: "removed_suggestions",
        locate_pattern: "removed_suggestions",
        extractor: count(
            "relationships_dismissed_suggested_users",
            "removed_suggestions_count",
        ),
        title: LocalizedText {
            en: "Number of accounts that you've removed from your suggestions",
            nl: "Aantal accounts dat je uit je suggesties hebt verwijderd",
            de: "Anzahl der aus deinen Vorschlägen entfernten Konten",
        },
    },
    DatasetDescriptor {
        name: "restricted_accounts",
        locate_pattern: "restricted_accounts",
        extractor: count("relationships_restricted_users", "restricted_accounts_count"),
        title: LocalizedText {
            en: "Number of accounts that you've restricted",
            nl: "Aantal accounts dat je hebt beperkt",
            de: "Anzahl der von dir eingeschränkten Konten",
        },
    },
    DatasetDescriptor {
        name: "your_topics",
        locate_pattern: "your_topics",
        extractor: Extractor::Record(ads::extract_your_topics),
        title: LocalizedText {
            en: "Your topics inferred by Instagram",
            nl: "Jouw onderwerpen volgens Instagram",
            de: "Deine von Instagram abgeleiteten Themen",
        },
    },
    DatasetDescriptor {
        name: "liked_posts",
        locate_pattern: "liked_posts",
        extractor: Extractor::Record(activity::extract_liked_posts),
        title: LocalizedText {
            en: "Number of posts liked each day",
            nl: "Aantal gelikete berichten per dag",
            de: "Anzahl gelikter Beiträge pro Tag",
        },
    },
    DatasetDescriptor {
        name: "post_comments",
        locate_pattern: "post_comments",
        extractor: Extractor::Record(activity::extract_post_comments),
        title: LocalizedText {
            en: "Number of comments written each day",
            nl: "Aantal geplaatste reacties per dag",
            de: "Anzahl geschriebener Kommentare pro Tag",
        },
    },
    DatasetDescriptor {
        name: "account_searches",
        locate_pattern: "account_searches",
        extractor: Extractor::Record(activity::extract_account_searches),
        title: LocalizedText {
            en: "Number of account searches each day",
            nl: "Aantal zoekopdrachten naar accounts per dag",
            de: "Anzahl der Kontosuchen pro Tag",
        },
    },
    DatasetDescriptor {
        name: "login_activity",
        locate_pattern: "login_activity",
        extractor: Extractor::Record(activity::extract_login_activity),
        title: LocalizedText {
            en: "Number of logins each day",
            nl: "Aantal keer ingelogd per dag",
            de: "Anzahl der Anmeldungen pro Tag",
        },
    },
    DatasetDescriptor {
        name: "profile_changes",
        locate_pattern: "profile_changes",
        extractor: Extractor::Record(activity::extract_profile_changes),
        title: LocalizedText {
            en: "Profile fields changed per day",
            nl: "Gewijzigde profielvelden per dag",
            de: "Geänderte Profilfelder pro Tag",
        },
    },
    DatasetDescriptor {
        name: "personal_information",
        locate_pattern: "personal_information/personal_information.json",
        extractor: Extractor::Named(identity::extract_personal_information),
        title: LocalizedText {
            en: "Does your name or username contain a first name?",
            nl: "Bevat je naam of gebruikersnaam een voornaam?",
            de: "Enthält dein Name oder Benutzername einen Vornamen?",
        },
    },
    DatasetDescriptor {
        name: "posts",
        locate_pattern: "posts_1",
        extractor: Extractor::Annotated(media::extract_posts),
        title: LocalizedText {
            en: "Your posts: faces and location tags",
            nl: "Jouw berichten: gezichten en locatiegegevens",
            de: "Deine Beiträge: Gesichter und Standortangaben",
        },
    },
    DatasetDescriptor {
        name: "stories",
        locate_pattern: "content/stories",
        extractor: Extractor::Annotated(media::extract_stories),
        title: LocalizedText {
            en: "Your stories: faces and location tags",
            nl: "Jouw verhalen: gezichten en locatiegegevens",
            de: "Deine Storys: Gesichter und Standortangaben",
        },
    },
];

pub fn find(name: &str) -> Option<&'static DatasetDescriptor> {
    REGISTRY.iter().find(|d| d.name == name)
}
