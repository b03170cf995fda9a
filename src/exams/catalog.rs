//! Built-in exam catalog.
//!
//! Every entry starts `UPCOMING` with dates staggered by catalog position;
//! live data replaces them where the hosted table has better information.

use super::{Exam, ExamDates, ExamStatus};

const SEARCH_BASE: &str = "https://www.google.com/search";
const FILE_SIZE_LIMIT: &str = "20KB - 100KB";

struct BaseExam {
    id: &'static str,
    name: &'static str,
    full_name: &'static str,
    category: &'static str,
    mode: &'static str,
    total_marks: u32,
    duration: &'static str,
}

const fn base(
    id: &'static str,
    name: &'static str,
    full_name: &'static str,
    category: &'static str,
    mode: &'static str,
    total_marks: u32,
    duration: &'static str,
) -> BaseExam {
    BaseExam { id, name, full_name, category, mode, total_marks, duration }
}

#[rustfmt::skip]
const BASE_EXAMS: [BaseExam; 35] = [
    // National
    base("jee-main", "JEE Main", "Joint Entrance Examination - Main", "Engineering", "CBT (Online)", 300, "3 Hours"),
    base("jee-adv", "JEE Advanced", "Joint Entrance Examination - Advanced", "Engineering", "CBT (Online)", 360, "6 Hours (2 Papers)"),
    base("neet-ug", "NEET UG", "National Eligibility cum Entrance Test", "Medical", "Pen & Paper", 720, "3 Hours 20 Mins"),
    base("gate", "GATE", "Graduate Aptitude Test in Engineering", "Engineering", "CBT (Online)", 100, "3 Hours"),
    base("upsc-cse", "UPSC CSE", "Civil Services Examination", "Civil Services", "Offline (Written)", 1750, "Multiple Days"),
    base("ssc-cgl", "SSC CGL", "Staff Selection Commission - Combined Graduate Level", "Government", "CBT (Online)", 200, "1 Hour"),
    // State civil services
    base("wbcs", "WBCS", "West Bengal Civil Service (Executive) Exam", "State Civil Services", "Offline", 1600, "Multiple Days"),
    base("bpsc", "BPSC", "Bihar Public Service Commission", "State Civil Services", "Offline", 1050, "3 Hours per paper"),
    base("uppsc", "UPPSC", "Uttar Pradesh Public Service Commission (PCS)", "State Civil Services", "Offline", 1500, "Multiple Days"),
    base("mpsc", "MPSC", "Maharashtra Public Service Commission", "State Civil Services", "Offline", 800, "Multiple Sessions"),
    base("tnpsc", "TNPSC Group 1", "Tamil Nadu Public Service Commission", "State Civil Services", "Offline", 850, "3 Hours"),
    base("kpsc", "KPSC KAS", "Karnataka Public Service Commission", "State Civil Services", "Offline", 1250, "Multiple Days"),
    base("gpsc", "GPSC", "Gujarat Public Service Commission", "State Civil Services", "Offline", 900, "3 Hours"),
    base("opsc", "OPSC", "Odisha Public Service Commission", "State Civil Services", "Offline", 2250, "Multiple Days"),
    // Banking and insurance
    base("ibps-po", "IBPS PO", "Probationary Officer - Banking", "Banking", "CBT (Online)", 100, "1 Hour (Prelims)"),
    base("sbi-po", "SBI PO", "State Bank of India - PO", "Banking", "CBT (Online)", 100, "1 Hour (Prelims)"),
    base("rbi-grade-b", "RBI Grade B", "Reserve Bank of India Officers", "Banking", "CBT (Online)", 200, "2 Hours"),
    base("lic-aao", "LIC AAO", "Life Insurance Corporation - AAO", "Insurance", "CBT (Online)", 350, "2.5 Hours"),
    // Management and law
    base("cat", "CAT", "Common Admission Test", "Management", "CBT (Online)", 198, "2 Hours"),
    base("clat", "CLAT", "Common Law Admission Test", "Law", "Offline", 120, "2 Hours"),
    base("nmat", "NMAT", "NMIMS Management Aptitude Test", "Management", "CBT (Online)", 360, "2 Hours"),
    // Defence
    base("nda", "NDA", "National Defence Academy Exam", "Defense", "Offline (OMR)", 900, "5 Hours Total"),
    base("cds", "CDS", "Combined Defence Services", "Defense", "Offline (OMR)", 300, "6 Hours"),
    base("afcat", "AFCAT", "Air Force Common Admission Test", "Defense", "CBT (Online)", 300, "2 Hours"),
    // Teaching and research
    base("ugc-net", "UGC NET", "University Grants Commission - NET", "Teaching", "CBT (Online)", 300, "3 Hours"),
    base("csir-net", "CSIR NET", "CSIR National Eligibility Test", "Research", "CBT (Online)", 200, "3 Hours"),
    // Undergraduate and design
    base("cuet-ug", "CUET UG", "Common University Entrance Test", "Undergraduate", "Hybrid", 800, "Varies by subject"),
    base("bit-sat", "BITSAT", "Birla Institute of Technology Aptitude Test", "Engineering", "CBT (Online)", 390, "3 Hours"),
    base("viteee", "VITEEE", "VIT Engineering Entrance Examination", "Engineering", "CBT (Online)", 125, "2.5 Hours"),
    base("wbjee", "WBJEE", "West Bengal Joint Entrance Examination", "Engineering", "Offline (OMR)", 200, "4 Hours"),
    base("mht-cet", "MHT CET", "Maharashtra Common Entrance Test", "Engineering", "CBT (Online)", 200, "3 Hours"),
    base("kcet", "KCET", "Karnataka Common Entrance Test", "Engineering", "Offline (OMR)", 180, "Varies"),
    base("uceed", "UCEED", "Undergraduate Common Entrance Examination for Design", "Design", "CBT + Offline", 300, "3 Hours"),
    base("nid-dat", "NID DAT", "National Institute of Design - DAT", "Design", "Offline", 100, "3 Hours"),
    base("nift", "NIFT", "National Institute of Fashion Technology Exam", "Design", "CBT + Situation Test", 100, "3 Hours"),
];

const REQUIREMENTS: [&str; 3] = [
    "Academic eligibility as per official notification 2026",
    "Valid Identity Proof (Aadhar/Passport)",
    "Digital photographs as per specific DPI guidelines",
];

const DOS: [&str; 5] = [
    "Download and print the admit card in advance.",
    "Carry a clear transparent water bottle.",
    "Follow the specific dress code mentioned in the instructions.",
    "Ensure all biometrics are recorded correctly.",
    "Maintain silence and follow the invigilator's instructions.",
];

const DONTS: [&str; 5] = [
    "No electronic gadgets like smartwatches or mobile phones.",
    "Do not carry any piece of paper other than the admit card.",
    "Avoid wearing jewelry or metallic items.",
    "Strictly no communication with other candidates.",
    "Do not leave the exam hall before the final bell.",
];

const THINGS_TO_CARRY: [&str; 4] = ["Admit Card", "Valid Photo ID", "Passport size photos", "Blue/Black Ball point pen"];

/// The full built-in catalog, in display order.
#[must_use]
pub fn static_catalog() -> Vec<Exam> {
    BASE_EXAMS.iter().enumerate().map(|(i, b)| build(i, b)).collect()
}

fn build(i: usize, b: &BaseExam) -> Exam {
    let engineering = b.category == "Engineering";
    let civil_services = b.category == "Civil Services";

    let focus = if engineering {
        "problem-solving"
    } else if civil_services {
        "analytical depth"
    } else {
        "speed and accuracy"
    };
    let description = format!(
        "Comprehensive details for {} ({}). This examination is a primary gateway for aspirants seeking careers in {}. \
         The {} format requires a specific strategy focused on {focus}. \
         Candidates are evaluated on a total of {} marks across various sections.",
        b.name, b.full_name, b.category, b.mode, b.total_marks
    );

    let dress_code = if civil_services {
        "Formal or simple casual wear. Avoid heavy accessories."
    } else {
        "Light colored simple clothes. No long sleeves. Only sandals or slippers."
    };
    let tools: [&str; 2] = if engineering { ["Formula Stamper", "PDF Compressor"] } else { ["Photo Resizer", "Date Stamper"] };

    Exam {
        id: b.id.to_string(),
        name: b.name.to_string(),
        full_name: b.full_name.to_string(),
        status: ExamStatus::Upcoming,
        category: b.category.to_string(),
        mode: b.mode.to_string(),
        total_marks: b.total_marks,
        duration: b.duration.to_string(),
        description,
        dates: staggered_dates(i),
        requirements: owned(&REQUIREMENTS),
        dos: owned(&DOS),
        donts: owned(&DONTS),
        dress_code: dress_code.to_string(),
        things_to_carry: owned(&THINGS_TO_CARRY),
        official_website: search_link(b.full_name),
        tool_recommendation: owned(&tools),
        file_size_limit: FILE_SIZE_LIMIT.to_string(),
    }
}

/// Placeholder 2026 schedule derived from catalog position.
fn staggered_dates(i: usize) -> ExamDates {
    ExamDates {
        registration_start: format!("2026-01-{}", 10 + i % 20),
        registration_end: format!("2026-02-{}", 15 + i % 10),
        admit_card_date: format!("2026-03-{}", 20 + i % 5),
        exam_date: format!("2026-04-{}", 15 + i % 10),
        result_date: format!("2026-05-{}", 20 + i % 5),
    }
}

/// Search link standing in until a live official link is known.
fn search_link(full_name: &str) -> String {
    let query = format!("{full_name} official website");
    reqwest::Url::parse_with_params(SEARCH_BASE, [("q", query.as_str())])
        .map_or_else(|_| SEARCH_BASE.to_string(), String::from)
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_has_35_unique_exams() {
        let exams = static_catalog();
        assert_eq!(exams.len(), 35);
        let ids: HashSet<_> = exams.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids.len(), 35);
        assert!(exams.iter().all(|e| e.status == ExamStatus::Upcoming));
    }

    #[test]
    fn dates_follow_catalog_position() {
        let exams = static_catalog();
        assert_eq!(
            exams[0].dates,
            ExamDates {
                registration_start: "2026-01-10".into(),
                registration_end: "2026-02-15".into(),
                admit_card_date: "2026-03-20".into(),
                exam_date: "2026-04-15".into(),
                result_date: "2026-05-20".into(),
            }
        );
        // i = 23: 10 + 3, 15 + 3, 20 + 3, 15 + 3, 20 + 3
        let afcat = &exams[23];
        assert_eq!(afcat.id, "afcat");
        assert_eq!(afcat.dates.registration_start, "2026-01-13");
        assert_eq!(afcat.dates.registration_end, "2026-02-18");
        assert_eq!(afcat.dates.admit_card_date, "2026-03-23");
        assert_eq!(afcat.dates.exam_date, "2026-04-18");
        assert_eq!(afcat.dates.result_date, "2026-05-23");
    }

    #[test]
    fn engineering_exams_recommend_formula_tools() {
        let exams = static_catalog();
        let gate = exams.iter().find(|e| e.id == "gate").unwrap();
        assert_eq!(gate.tool_recommendation, vec!["Formula Stamper", "PDF Compressor"]);
        assert!(gate.description.contains("problem-solving"));
        let cat = exams.iter().find(|e| e.id == "cat").unwrap();
        assert_eq!(cat.tool_recommendation, vec!["Photo Resizer", "Date Stamper"]);
        assert!(cat.description.contains("speed and accuracy"));
    }

    #[test]
    fn only_national_civil_services_get_formal_dress_code() {
        let exams = static_catalog();
        let upsc = exams.iter().find(|e| e.id == "upsc-cse").unwrap();
        assert!(upsc.dress_code.starts_with("Formal"));
        assert!(upsc.description.contains("analytical depth"));
        let wbcs = exams.iter().find(|e| e.id == "wbcs").unwrap();
        assert!(wbcs.dress_code.starts_with("Light colored"));
    }

    #[test]
    fn official_website_is_encoded_search_link() {
        let exams = static_catalog();
        let link = &exams[0].official_website;
        assert!(link.starts_with("https://www.google.com/search?q="));
        assert!(link.contains("Joint+Entrance+Examination"));
        assert!(!link.contains(' '));
    }
}
